use anyhow::Result;
use rank_rollup::keyword::{EntryParser, normalize};
use rank_rollup::render::keyword_line;
use tracing::info;

use crate::cli::{NormalizeArgs, ParseArgs};

pub fn run_parse(args: ParseArgs) -> Result<()> {
    let parser = EntryParser::new()?;

    let records = args
        .entries
        .iter()
        .flat_map(|raw| parser.parse_entries(raw))
        .collect::<Vec<_>>();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}", keyword_line(record));
        }
    }

    info!(inputs = args.entries.len(), records = records.len(), "parse completed");
    Ok(())
}

pub fn run_normalize(args: NormalizeArgs) -> Result<()> {
    for keyword in &args.keywords {
        println!("{keyword}\t{}", normalize(keyword));
    }
    Ok(())
}
