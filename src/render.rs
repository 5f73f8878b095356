use std::collections::BTreeMap;

use crate::aggregate::PageAggregate;
use crate::budget::{PayloadSummary, ReportPayload, SHEET_CELL_MAX_BYTES, fit_cell};
use crate::coverage::CoverageJoin;
use crate::model::{CoverageEntry, KeywordRecord};

const MISSING_METRIC: &str = "-";

pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
            format!("{}", number as i64)
        }
        Some(number) => format!("{number:.1}"),
        None => MISSING_METRIC.to_string(),
    }
}

pub fn keyword_line(record: &KeywordRecord) -> String {
    format!(
        "{} (rank: {}, clicks: {}, SV: {})",
        record.keyword,
        format_metric(record.rank),
        format_metric(record.clicks),
        format_metric(record.search_volume)
    )
}

// Falls back to the legacy clicks-only form when impressions or position
// are unknown.
pub fn search_console_entry(record: &KeywordRecord) -> String {
    match (record.clicks, record.impressions, record.rank) {
        (Some(clicks), Some(impressions), Some(rank)) => {
            let mut entry = format!(
                "{}(click: {}, impression: {}, position: {}",
                record.keyword,
                format_metric(Some(clicks)),
                format_metric(Some(impressions)),
                format_metric(Some(rank))
            );
            if let Some(ctr) = record.ctr {
                entry.push_str(&format!(", ctr: {}%", format_metric(Some(ctr))));
            }
            entry.push(')');
            entry
        }
        (Some(clicks), _, _) => format!("{}({})", record.keyword, format_metric(Some(clicks))),
        _ => record.keyword.clone(),
    }
}

pub fn coverage_line(entry: &CoverageEntry) -> String {
    format!("{} (SV: {})", entry.text, format_metric(entry.search_volume))
}

pub fn bucket_lines(aggregate: &PageAggregate) -> BTreeMap<String, Vec<String>> {
    aggregate
        .buckets()
        .map(|(label, records)| {
            (
                label.to_string(),
                records.into_iter().map(keyword_line).collect(),
            )
        })
        .collect()
}

pub fn bucket_table(aggregate: &PageAggregate) -> String {
    let mut table = String::from("| bucket | keywords | clicks |\n|---|---|---|\n");
    for (label, records) in aggregate.buckets() {
        let clicks = records
            .iter()
            .map(|record| record.clicks_or_zero())
            .sum::<f64>();
        table.push_str(&format!(
            "| {label} | {} | {} |\n",
            records.len(),
            format_metric(Some(clicks))
        ));
    }
    table
}

pub fn build_payload(
    aggregate: &PageAggregate,
    join: &CoverageJoin,
    analysis: &str,
    notes: &[String],
) -> ReportPayload {
    let summary = PayloadSummary {
        page: aggregate.page().to_string(),
        region: aggregate.region().map(|region| region.as_str().to_string()),
        best_query: aggregate.best_query().map(|record| record.keyword.clone()),
        prev_best_query: aggregate
            .prev_best_query()
            .map(|record| record.keyword.clone()),
        totals: aggregate.totals().clone(),
        covered_count: join.covered.len(),
        uncovered_count: join.uncovered.len(),
        zero_volume_count: join.zero_volume.len(),
    };

    let mut all_notes = notes.to_vec();
    all_notes.extend(
        join.zero_volume
            .iter()
            .map(|entry| format!("{} has no measurable search volume", entry.text)),
    );

    let coverage_detail = join
        .covered
        .iter()
        .chain(join.uncovered.iter())
        .cloned()
        .collect::<Vec<CoverageEntry>>();

    ReportPayload {
        success: true,
        analysis: fit_cell(analysis, SHEET_CELL_MAX_BYTES),
        truncated: false,
        summary: Some(summary),
        top_keywords: aggregate
            .ranked_records()
            .into_iter()
            .map(keyword_line)
            .collect(),
        previous_keywords: aggregate
            .prev_records_ranked()
            .into_iter()
            .map(keyword_line)
            .collect(),
        covered_keywords: join.covered.iter().map(coverage_line).collect(),
        uncovered_keywords: join.uncovered.iter().map(coverage_line).collect(),
        notes: all_notes,
        coverage_detail: (!coverage_detail.is_empty()).then_some(coverage_detail),
        table_text: Some(fit_cell(&bucket_table(aggregate), SHEET_CELL_MAX_BYTES)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::coverage::join;
    use crate::keyword::EntryParser;

    #[test]
    fn keyword_line_renders_missing_metrics_as_dash() {
        let record = KeywordRecord::new("沖繩住宿")
            .with_rank(Some(2.0))
            .with_clicks(Some(95.0));

        assert_eq!(keyword_line(&record), "沖繩住宿 (rank: 2, clicks: 95, SV: -)");
    }

    #[test]
    fn search_console_entry_decodes_to_same_metrics() {
        let parser = EntryParser::new().expect("keyword patterns compile");
        let record = KeywordRecord::new("日本自由行")
            .with_clicks(Some(120.0))
            .with_impressions(Some(3000.0))
            .with_rank(Some(5.2))
            .with_ctr(Some(4.0));

        let encoded = search_console_entry(&record);
        assert_eq!(
            encoded,
            "日本自由行(click: 120, impression: 3000, position: 5.2, ctr: 4%)"
        );
        assert_eq!(parser.parse_entry(&encoded), record);

        let legacy = KeywordRecord::new("機票比較").with_clicks(Some(45.0));
        assert_eq!(search_console_entry(&legacy), "機票比較(45)");
        assert_eq!(parser.parse_entry(&search_console_entry(&legacy)), legacy);
    }

    #[test]
    fn build_payload_collects_lines_and_zero_volume_notes() {
        let mut aggregate = aggregate(
            "https://example.com/tw/okinawa/",
            vec![
                KeywordRecord::new("沖繩住宿")
                    .with_rank(Some(2.0))
                    .with_clicks(Some(95.0)),
                KeywordRecord::new("沖繩租車")
                    .with_rank(Some(15.0))
                    .with_clicks(Some(4.0)),
            ],
            vec![KeywordRecord::new("沖繩住宿")
                .with_rank(Some(3.0))
                .with_clicks(Some(70.0))],
        );
        let join = join(
            &mut aggregate,
            &[
                CoverageEntry::new("沖繩住宿", Some(8100.0)),
                CoverageEntry::new("沖繩自由行", Some(0.0)),
            ],
        );

        let payload = build_payload(&aggregate, &join, "analysis", &["keep".to_string()]);

        assert_eq!(payload.top_keywords, vec!["沖繩住宿 (rank: 2, clicks: 95, SV: 8100)"]);
        assert_eq!(
            payload.previous_keywords,
            vec!["沖繩住宿 (rank: 3, clicks: 70, SV: 8100)"]
        );
        assert_eq!(payload.covered_keywords, vec!["沖繩住宿 (SV: 8100)"]);
        assert_eq!(payload.uncovered_keywords, vec!["沖繩自由行 (SV: 0)"]);
        assert_eq!(
            payload.notes,
            vec!["keep", "沖繩自由行 has no measurable search volume"]
        );
        assert_eq!(payload.coverage_detail.as_ref().map(Vec::len), Some(2));

        let summary = payload.summary.expect("summary present");
        assert_eq!(summary.region.as_deref(), Some("tw"));
        assert_eq!(summary.best_query.as_deref(), Some("沖繩住宿"));
        assert_eq!(summary.zero_volume_count, 1);
    }

    #[test]
    fn bucket_table_lists_every_bucket() {
        let aggregate = aggregate(
            "https://example.com/",
            vec![KeywordRecord::new("a")
                .with_rank(Some(4.0))
                .with_clicks(Some(7.5))],
            Vec::new(),
        );

        let table = bucket_table(&aggregate);
        assert!(table.contains("| 4 | 1 | 7.5 |"));
        assert!(table.contains("| >10 | 0 | 0 |"));
        assert_eq!(table.lines().count(), 13);
    }
}
