use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rank_rollup::aggregate::aggregate;
use rank_rollup::budget::shrink_to_fit_traced;
use rank_rollup::coverage::join;
use rank_rollup::ingest::{
    HeaderIndex, PageInputs, canonical_page_url, ingest_rank_export, ingest_search_console,
    merge_page_inputs,
};
use rank_rollup::keyword::{EntryParser, GRAMMAR_VERSION};
use rank_rollup::model::{
    AggregateRunManifest, CoverageEntry, CoverageFile, InputFileHash, PageReport,
    RankExportSheet, SearchConsolePage,
};
use rank_rollup::render::{bucket_lines, build_payload};
use tracing::{debug, info, warn};

use crate::cli::AggregateArgs;
use crate::util::{now_utc_string, read_json, sha256_file, utc_compact_string, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: AggregateArgs) -> Result<()> {
    let started_ts = Utc::now();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    if args.rank_export.is_none() && args.search_console.is_none() {
        bail!("aggregate needs --rank-export, --search-console, or both");
    }

    info!(run_id = %run_id, max_bytes = args.max_bytes, "starting aggregate");

    let manifest = build_manifest(&args, run_id)?;

    if args.dry_run {
        info!(
            page_count = manifest.page_count,
            warnings = manifest.warnings.len(),
            "aggregate dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.cache_root.join("manifests").join(format!(
            "aggregate_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote aggregate manifest");
    info!(page_count = manifest.page_count, "aggregate completed");

    Ok(())
}

pub fn build_manifest(args: &AggregateArgs, run_id: String) -> Result<AggregateRunManifest> {
    let mut inputs = Vec::new();
    let mut warnings = Vec::new();
    let mut sources = Vec::new();

    if let Some(path) = args.rank_export.as_deref() {
        inputs.push(hash_input("rank_export", path)?);
        let sheet: RankExportSheet = read_json(path)?;
        let mut headers = HeaderIndex::new(&sheet.header);
        let ingest = ingest_rank_export(&sheet, &mut headers)
            .with_context(|| format!("invalid rank export: {}", path.display()))?;

        debug!(
            lookups = headers.cached_lookups(),
            rows = sheet.rows.len(),
            "resolved rank export header"
        );
        if ingest.skipped_rows > 0 {
            warn!(
                skipped = ingest.skipped_rows,
                "rank export rows without keyword or url were skipped"
            );
            warnings.push(format!(
                "{} rank export rows without keyword or url were skipped",
                ingest.skipped_rows
            ));
        }
        sources.extend(ingest.pages);
    }

    if let Some(path) = args.search_console.as_deref() {
        inputs.push(hash_input("search_console", path)?);
        let pages: Vec<SearchConsolePage> = read_json(path)?;
        let parser = EntryParser::new()?;
        sources.extend(pages.iter().map(|page| ingest_search_console(&parser, page)));
    }

    let coverage = match args.coverage.as_deref() {
        Some(path) => {
            inputs.push(hash_input("coverage", path)?);
            let file: CoverageFile = read_json(path)?;
            index_coverage_file(file)
        }
        None => BTreeMap::new(),
    };

    let analyses: BTreeMap<String, String> = match args.analysis.as_deref() {
        Some(path) => {
            inputs.push(hash_input("analysis", path)?);
            let file: BTreeMap<String, String> = read_json(path)?;
            file.into_iter()
                .map(|(page, text)| (canonical_page_url(&page), text))
                .collect()
        }
        None => BTreeMap::new(),
    };

    let wanted = args
        .pages
        .iter()
        .map(|page| canonical_page_url(page))
        .collect::<HashSet<_>>();

    let mut pages = Vec::new();
    for page_inputs in merge_page_inputs(sources) {
        if !wanted.is_empty() && !wanted.contains(&page_inputs.page) {
            continue;
        }

        let external = coverage
            .get(&page_inputs.page)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let analysis = analyses
            .get(&page_inputs.page)
            .map(String::as_str)
            .unwrap_or_default();
        let report = build_page_report(page_inputs, external, analysis, args.max_bytes);

        if report.summary.totals.total_keywords == 0 {
            warnings.push(format!("{} has no keywords", report.summary.page));
        }
        pages.push(report);
    }

    for page in coverage.keys() {
        if !pages.iter().any(|report| &report.summary.page == page) {
            debug!(page = %page, "coverage entries have no matching page");
        }
    }

    for page in &wanted {
        if !pages.iter().any(|report| &report.summary.page == page) {
            warn!(page = %page, "requested page not found in inputs");
            warnings.push(format!("{page} was requested but not found in inputs"));
        }
    }

    Ok(AggregateRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        generated_at: now_utc_string(),
        grammar_version: GRAMMAR_VERSION,
        max_bytes: args.max_bytes,
        inputs,
        page_count: pages.len(),
        pages,
        warnings,
    })
}

fn build_page_report(
    inputs: PageInputs,
    external: &[CoverageEntry],
    analysis: &str,
    max_bytes: usize,
) -> PageReport {
    let PageInputs {
        page,
        current,
        previous,
        volumes,
    } = inputs;

    let mut aggregate = aggregate(&page, current, previous);

    let coverage_entries = external
        .iter()
        .cloned()
        .chain(volumes)
        .collect::<Vec<_>>();
    let coverage = join(&mut aggregate, &coverage_entries);

    let payload = build_payload(&aggregate, &coverage, analysis, &[]);
    let trace = shrink_to_fit_traced(payload, max_bytes);
    if trace.bytes > max_bytes {
        warn!(
            page = %page,
            bytes = trace.bytes,
            max_bytes,
            "payload stub still exceeds budget"
        );
    }

    let summary = aggregate.summary();
    info!(
        page = %page,
        keywords = summary.totals.total_keywords,
        clicks = summary.totals.total_clicks,
        coverage_entries = coverage.entry_count(),
        covered = coverage.covered.len(),
        uncovered = coverage.uncovered.len(),
        bytes = trace.bytes,
        steps = trace.steps.len(),
        "aggregated page"
    );

    PageReport {
        bucket_lines: bucket_lines(&aggregate),
        zero_click_keywords: aggregate
            .zero_click_keywords()
            .into_iter()
            .map(|record| record.keyword.clone())
            .collect(),
        summary,
        coverage,
        payload_bytes: trace.bytes,
        shrink_steps: trace
            .steps
            .iter()
            .map(|step| step.name.to_string())
            .collect(),
        payload: trace.payload,
    }
}

fn index_coverage_file(file: CoverageFile) -> BTreeMap<String, Vec<CoverageEntry>> {
    let mut indexed = BTreeMap::<String, Vec<CoverageEntry>>::new();
    for (page, entries) in file {
        indexed
            .entry(canonical_page_url(&page))
            .or_default()
            .extend(entries);
    }
    indexed
}

fn hash_input(role: &str, path: &Path) -> Result<InputFileHash> {
    Ok(InputFileHash {
        role: role.to_string(),
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
    })
}
