use anyhow::Result;
use rank_rollup::budget::{ReportPayload, shrink_to_fit_traced};
use tracing::{info, warn};

use crate::cli::ShrinkArgs;
use crate::util::{read_json, write_json_pretty};

pub fn run(args: ShrinkArgs) -> Result<()> {
    let payload: ReportPayload = read_json(&args.payload)?;
    let trace = shrink_to_fit_traced(payload, args.max_bytes);

    for step in &trace.steps {
        info!(step = step.name, bytes = step.bytes, "applied reduction");
    }
    if trace.bytes > args.max_bytes {
        warn!(
            bytes = trace.bytes,
            max_bytes = args.max_bytes,
            "minimal stub still exceeds budget"
        );
    }

    match args.output.as_deref() {
        Some(path) => {
            write_json_pretty(path, &trace.payload)?;
            info!(path = %path.display(), "wrote shrunk payload");
        }
        None => println!("{}", serde_json::to_string(&trace.payload)?),
    }

    info!(
        initial_bytes = trace.initial_bytes,
        bytes = trace.bytes,
        max_bytes = args.max_bytes,
        "shrink completed"
    );

    Ok(())
}
