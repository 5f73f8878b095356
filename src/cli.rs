use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rank_rollup::budget::DEFAULT_MAX_BYTES;

#[derive(Parser, Debug)]
#[command(
    name = "rank-rollup",
    version,
    about = "Per-page keyword rank aggregation and coverage reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Aggregate(AggregateArgs),
    Shrink(ShrinkArgs),
    Parse(ParseArgs),
    Normalize(NormalizeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AggregateArgs {
    #[arg(long)]
    pub rank_export: Option<PathBuf>,

    #[arg(long)]
    pub search_console: Option<PathBuf>,

    #[arg(long)]
    pub coverage: Option<PathBuf>,

    #[arg(long)]
    pub analysis: Option<PathBuf>,

    #[arg(long = "page")]
    pub pages: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    pub max_bytes: usize,

    #[arg(long, default_value = ".cache/rank-rollup")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShrinkArgs {
    #[arg(long)]
    pub payload: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    pub max_bytes: usize,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[arg(required = true)]
    pub entries: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    #[arg(required = true)]
    pub keywords: Vec<String>,
}
