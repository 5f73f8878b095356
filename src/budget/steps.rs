use super::ReportPayload;

pub type ReductionStep = fn(ReportPayload) -> ReportPayload;

pub const REDUCTION_STEPS: &[(&str, ReductionStep)] = &[
    ("clear_narrative", clear_narrative),
    ("cap_lists_wide", cap_lists_wide),
    ("cap_lists_narrow", cap_lists_narrow),
    ("drop_structured_detail", drop_structured_detail),
    ("minimal_stub", minimal_stub),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCaps {
    pub top_keywords: usize,
    pub previous_keywords: usize,
    pub covered_keywords: usize,
    pub uncovered_keywords: usize,
    pub notes: usize,
    pub coverage_detail: usize,
}

pub const WIDE_CAPS: ListCaps = ListCaps {
    top_keywords: 10,
    previous_keywords: 6,
    covered_keywords: 8,
    uncovered_keywords: 6,
    notes: 4,
    coverage_detail: 8,
};

pub const NARROW_CAPS: ListCaps = ListCaps {
    top_keywords: 6,
    previous_keywords: 4,
    covered_keywords: 6,
    uncovered_keywords: 4,
    notes: 2,
    coverage_detail: 4,
};

fn clear_narrative(mut payload: ReportPayload) -> ReportPayload {
    payload.analysis.clear();
    payload.truncated = true;
    payload
}

fn cap_lists_wide(payload: ReportPayload) -> ReportPayload {
    cap_lists(payload, WIDE_CAPS)
}

fn cap_lists_narrow(payload: ReportPayload) -> ReportPayload {
    cap_lists(payload, NARROW_CAPS)
}

fn cap_lists(mut payload: ReportPayload, caps: ListCaps) -> ReportPayload {
    payload.top_keywords.truncate(caps.top_keywords);
    payload.previous_keywords.truncate(caps.previous_keywords);
    payload.covered_keywords.truncate(caps.covered_keywords);
    payload.uncovered_keywords.truncate(caps.uncovered_keywords);
    payload.notes.truncate(caps.notes);
    if let Some(detail) = payload.coverage_detail.as_mut() {
        detail.truncate(caps.coverage_detail);
    }
    payload.truncated = true;
    payload
}

// Scalar summary survives; every list and structured block goes.
fn drop_structured_detail(mut payload: ReportPayload) -> ReportPayload {
    payload.coverage_detail = None;
    payload.table_text = None;
    payload.top_keywords.clear();
    payload.previous_keywords.clear();
    payload.covered_keywords.clear();
    payload.uncovered_keywords.clear();
    payload.notes.clear();
    payload.truncated = true;
    payload
}

fn minimal_stub(payload: ReportPayload) -> ReportPayload {
    ReportPayload::stub(payload.success)
}
