use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::PageTotals;
use crate::model::CoverageEntry;

mod steps;
#[cfg(test)]
mod tests;

pub use steps::{ListCaps, NARROW_CAPS, REDUCTION_STEPS, ReductionStep, WIDE_CAPS};

pub const SHEET_CELL_MAX_BYTES: usize = 50_000;
pub const DEFAULT_MAX_BYTES: usize = SHEET_CELL_MAX_BYTES;

const CELL_TRUNCATION_MARKER: &str = "…";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSummary {
    pub page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_best_query: Option<String>,
    pub totals: PageTotals,
    pub covered_count: usize,
    pub uncovered_count: usize,
    pub zero_volume_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub success: bool,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PayloadSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub covered_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uncovered_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_detail: Option<Vec<CoverageEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_text: Option<String>,
}

impl ReportPayload {
    pub fn stub(success: bool) -> Self {
        Self {
            success,
            truncated: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedStep {
    pub name: &'static str,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkTrace {
    pub payload: ReportPayload,
    pub initial_bytes: usize,
    pub bytes: usize,
    pub steps: Vec<AppliedStep>,
}

pub fn shrink_to_fit(payload: ReportPayload, max_bytes: usize) -> ReportPayload {
    shrink_to_fit_traced(payload, max_bytes).payload
}

pub fn shrink_to_fit_traced(payload: ReportPayload, max_bytes: usize) -> ShrinkTrace {
    let initial_bytes = serialized_size(&payload);
    let mut current = payload;
    let mut bytes = initial_bytes;
    let mut applied = Vec::new();

    // Steps only remove content; the last one always yields the stub.
    for &(name, step) in REDUCTION_STEPS {
        if bytes <= max_bytes {
            break;
        }

        current = step(current);
        bytes = serialized_size(&current);
        debug!(step = name, bytes, max_bytes, "applied payload reduction");
        applied.push(AppliedStep { name, bytes });
    }

    ShrinkTrace {
        payload: current,
        initial_bytes,
        bytes,
        steps: applied,
    }
}

pub fn serialized_size(payload: &ReportPayload) -> usize {
    serde_json::to_vec(payload)
        .map(|encoded| encoded.len())
        .unwrap_or(usize::MAX)
}

// The ellipsis marker counts toward max_bytes.
pub fn fit_cell(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }

    if max_bytes < CELL_TRUNCATION_MARKER.len() {
        return text[..floor_char_boundary(text, max_bytes)].to_string();
    }

    let cut = floor_char_boundary(text, max_bytes - CELL_TRUNCATION_MARKER.len());
    format!("{}{CELL_TRUNCATION_MARKER}", &text[..cut])
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut cut = index.min(text.len());
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}
