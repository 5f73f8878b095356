use super::*;

fn lines(prefix: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|index| format!("{prefix} keyword {index} (rank: {index}, clicks: 10, SV: 500)"))
        .collect()
}

fn large_payload() -> ReportPayload {
    ReportPayload {
        success: true,
        analysis: "整體排名表現穩定。".repeat(200),
        truncated: false,
        summary: Some(PayloadSummary {
            page: "https://example.com/okinawa/".to_string(),
            region: Some("tw".to_string()),
            best_query: Some("沖繩住宿".to_string()),
            prev_best_query: None,
            totals: PageTotals {
                total_clicks: 215.0,
                total_keywords: 40,
                ..PageTotals::default()
            },
            covered_count: 12,
            uncovered_count: 9,
            zero_volume_count: 2,
        }),
        top_keywords: lines("top", 30),
        previous_keywords: lines("prev", 20),
        covered_keywords: lines("covered", 12),
        uncovered_keywords: lines("uncovered", 9),
        notes: lines("note", 7),
        coverage_detail: Some(
            (0..12)
                .map(|index| CoverageEntry::new(format!("coverage {index}"), Some(100.0)))
                .collect(),
        ),
        table_text: Some("| keyword | rank |\n".repeat(60)),
    }
}

fn step_output(payload: ReportPayload, step_count: usize) -> ReportPayload {
    REDUCTION_STEPS
        .iter()
        .take(step_count)
        .fold(payload, |current, (_, step)| step(current))
}

#[test]
fn payload_within_budget_is_returned_untouched() {
    let payload = large_payload();
    let trace = shrink_to_fit_traced(payload.clone(), usize::MAX);

    assert_eq!(trace.payload, payload);
    assert!(trace.steps.is_empty());
    assert!(!trace.payload.truncated);
    assert_eq!(trace.bytes, trace.initial_bytes);
}

#[test]
fn narrative_is_dropped_first() {
    let payload = large_payload();
    let budget = serialized_size(&step_output(payload.clone(), 1));

    let trace = shrink_to_fit_traced(payload, budget);

    assert_eq!(trace.steps.len(), 1);
    assert_eq!(trace.steps[0].name, "clear_narrative");
    assert!(trace.payload.analysis.is_empty());
    assert!(trace.payload.truncated);
    assert_eq!(trace.payload.top_keywords.len(), 30);
}

#[test]
fn wide_caps_limit_each_list() {
    let payload = large_payload();
    let budget = serialized_size(&step_output(payload.clone(), 2));

    let shrunk = shrink_to_fit(payload, budget);

    assert_eq!(shrunk.top_keywords.len(), WIDE_CAPS.top_keywords);
    assert_eq!(shrunk.previous_keywords.len(), WIDE_CAPS.previous_keywords);
    assert_eq!(shrunk.covered_keywords.len(), WIDE_CAPS.covered_keywords);
    assert_eq!(shrunk.uncovered_keywords.len(), WIDE_CAPS.uncovered_keywords);
    assert_eq!(shrunk.notes.len(), WIDE_CAPS.notes);
    assert_eq!(shrunk.top_keywords[0], "top keyword 1 (rank: 1, clicks: 10, SV: 500)");
    assert!(shrunk.table_text.is_some());
}

#[test]
fn structured_detail_is_dropped_but_summary_kept() {
    let payload = large_payload();
    let budget = serialized_size(&step_output(payload.clone(), 4));

    let shrunk = shrink_to_fit(payload, budget);

    assert!(shrunk.coverage_detail.is_none());
    assert!(shrunk.table_text.is_none());
    assert!(shrunk.top_keywords.is_empty());
    assert_eq!(
        shrunk.summary.as_ref().map(|summary| summary.covered_count),
        Some(12)
    );
    assert!(shrunk.truncated);
}

#[test]
fn tiny_budget_returns_minimal_stub() {
    let mut payload = large_payload();
    payload.success = false;

    let shrunk = shrink_to_fit(payload, 10);

    assert_eq!(shrunk, ReportPayload::stub(false));
    assert_eq!(
        serde_json::to_string(&shrunk).expect("stub serializes"),
        r#"{"success":false,"analysis":"","truncated":true}"#
    );
}

#[test]
fn output_fits_any_budget_at_least_stub_size() {
    let payload = large_payload();
    let stub_size = serialized_size(&ReportPayload::stub(true));
    let full_size = serialized_size(&payload);

    for budget in (stub_size..=full_size).step_by(97) {
        let trace = shrink_to_fit_traced(payload.clone(), budget);
        assert!(
            trace.bytes <= budget,
            "budget {budget} produced {} bytes",
            trace.bytes
        );
        assert_eq!(trace.bytes, serialized_size(&trace.payload));
    }
}

#[test]
fn step_sizes_never_grow() {
    let trace = shrink_to_fit_traced(large_payload(), 0);

    let mut previous = trace.initial_bytes;
    for step in &trace.steps {
        assert!(step.bytes <= previous, "{} grew the payload", step.name);
        previous = step.bytes;
    }
    assert_eq!(trace.steps.len(), REDUCTION_STEPS.len());
    assert_eq!(trace.payload, ReportPayload::stub(true));
}

#[test]
fn shrinking_is_deterministic() {
    let payload = large_payload();
    let budget = serialized_size(&step_output(payload.clone(), 3)) + 5;

    let first = shrink_to_fit_traced(payload.clone(), budget);
    let second = shrink_to_fit_traced(payload, budget);

    assert_eq!(first, second);
}

#[test]
fn stub_payload_round_trips_through_json() {
    let decoded: ReportPayload =
        serde_json::from_str(r#"{"success":true,"analysis":"","truncated":true}"#)
            .expect("stub deserializes");

    assert_eq!(decoded, ReportPayload::stub(true));
}

#[test]
fn fit_cell_cuts_on_char_boundaries() {
    assert_eq!(fit_cell("short", 10), "short");
    assert_eq!(fit_cell("abcdefgh", 6), "abc…");
    assert_eq!(fit_cell("沖繩住宿", 8), "沖…");
    assert_eq!(fit_cell("沖繩住宿", 2), "");
    assert_eq!(fit_cell("abc", 2), "ab");

    let cell = fit_cell(&"沖".repeat(SHEET_CELL_MAX_BYTES), SHEET_CELL_MAX_BYTES);
    assert!(cell.len() <= SHEET_CELL_MAX_BYTES);
    assert!(cell.ends_with('…'));
}
