use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::PageSummary;
use crate::budget::ReportPayload;
use crate::coverage::CoverageJoin;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    pub keyword: String,
    #[serde(default)]
    pub rank: Option<f64>,
    #[serde(default)]
    pub clicks: Option<f64>,
    #[serde(default)]
    pub impressions: Option<f64>,
    #[serde(default)]
    pub ctr: Option<f64>,
    #[serde(default)]
    pub search_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl KeywordRecord {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    pub fn with_rank(mut self, rank: Option<f64>) -> Self {
        self.rank = finite(rank);
        self
    }

    pub fn with_clicks(mut self, clicks: Option<f64>) -> Self {
        self.clicks = finite(clicks);
        self
    }

    pub fn with_impressions(mut self, impressions: Option<f64>) -> Self {
        self.impressions = finite(impressions);
        self
    }

    pub fn with_ctr(mut self, ctr: Option<f64>) -> Self {
        self.ctr = finite(ctr);
        self
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    // Only fills ctr when the source left it out.
    pub fn with_derived_ctr(mut self) -> Self {
        if self.ctr.is_none() {
            if let (Some(clicks), Some(impressions)) = (self.clicks, self.impressions) {
                if impressions > 0.0 {
                    self.ctr = finite(Some(clicks * 100.0 / impressions));
                }
            }
        }
        self
    }

    pub fn clicks_or_zero(&self) -> f64 {
        self.clicks.unwrap_or(0.0)
    }

    pub fn impressions_or_zero(&self) -> f64 {
        self.impressions.unwrap_or(0.0)
    }
}

pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|number| number.is_finite())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEntry {
    pub text: String,
    #[serde(default)]
    pub search_volume: Option<f64>,
    #[serde(default)]
    pub gsc_clicks: Option<f64>,
    #[serde(default)]
    pub gsc_impressions: Option<f64>,
}

impl CoverageEntry {
    pub fn new(text: impl Into<String>, search_volume: Option<f64>) -> Self {
        Self {
            text: text.into(),
            search_volume: finite(search_volume),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankExportSheet {
    pub header: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConsolePage {
    pub page: String,
    #[serde(default)]
    pub best_query: Option<String>,
    #[serde(default)]
    pub prev_best_query: Option<String>,
    #[serde(default)]
    pub rank_buckets: BTreeMap<String, String>,
}

pub type CoverageFile = BTreeMap<String, Vec<CoverageEntry>>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputFileHash {
    pub role: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub summary: PageSummary,
    pub bucket_lines: BTreeMap<String, Vec<String>>,
    pub zero_click_keywords: Vec<String>,
    pub coverage: CoverageJoin,
    pub payload: ReportPayload,
    pub payload_bytes: usize,
    pub shrink_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub grammar_version: u32,
    pub max_bytes: usize,
    pub inputs: Vec<InputFileHash>,
    pub page_count: usize,
    pub pages: Vec<PageReport>,
    pub warnings: Vec<String>,
}
