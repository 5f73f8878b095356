use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::keyword::{NormalizedKey, normalize};
use crate::model::KeywordRecord;

mod bucket;
mod region;

pub use bucket::BucketLabel;
pub use region::{RegionCode, infer_region};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTotals {
    pub total_clicks: f64,
    pub total_impressions: f64,
    pub keywords_1to10_count: usize,
    pub keywords_4to10_count: usize,
    pub total_keywords: usize,
    pub potential_traffic: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords_1to10_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords_4to10_ratio: Option<String>,
}

// Records live once in `records`/`prev_records`; every other field indexes
// into them so coverage enrichment is seen by all views.
#[derive(Debug, Clone)]
pub struct PageAggregate {
    page: String,
    region: Option<RegionCode>,
    records: Vec<KeywordRecord>,
    prev_records: Vec<KeywordRecord>,
    best_query: Option<usize>,
    prev_best_query: Option<usize>,
    buckets: BTreeMap<BucketLabel, Vec<usize>>,
    unbucketed: Vec<usize>,
    zero_click: Vec<usize>,
    totals: PageTotals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub page: String,
    pub region: Option<RegionCode>,
    pub best_query: Option<KeywordRecord>,
    pub prev_best_query: Option<KeywordRecord>,
    pub bucket_counts: BTreeMap<String, usize>,
    pub unbucketed_count: usize,
    pub zero_click_count: usize,
    pub totals: PageTotals,
}

pub fn aggregate(
    page: &str,
    records: Vec<KeywordRecord>,
    prev_records: Vec<KeywordRecord>,
) -> PageAggregate {
    let records = dedup_by_normalized_key(records);
    let prev_records = dedup_by_normalized_key(prev_records);

    let mut buckets = BucketLabel::all()
        .map(|label| (label, Vec::new()))
        .collect::<BTreeMap<BucketLabel, Vec<usize>>>();
    let mut unbucketed = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match BucketLabel::for_rank(record.rank) {
            Some(label) => buckets.entry(label).or_default().push(index),
            None => unbucketed.push(index),
        }
    }
    for indices in buckets.values_mut() {
        indices.sort_by(|a, b| compare_for_listing(&records[*a], &records[*b]));
    }

    let top_three = buckets
        .iter()
        .filter(|(label, _)| label.is_top_three())
        .flat_map(|(_, indices)| indices.iter().copied())
        .collect::<Vec<usize>>();
    let best_query = select_best(&records, top_three)
        .or_else(|| select_best(&records, 0..records.len()));
    let prev_best_query = select_best(&prev_records, 0..prev_records.len());

    let zero_click = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.clicks == Some(0.0))
        .map(|(index, _)| index)
        .collect::<Vec<usize>>();

    let totals = compute_totals(&records, &buckets);
    let region = infer_region(
        records
            .iter()
            .chain(prev_records.iter())
            .filter_map(|record| record.country.as_deref()),
        page,
    );

    debug!(
        page,
        keywords = totals.total_keywords,
        unbucketed = unbucketed.len(),
        potential_traffic = totals.potential_traffic,
        "aggregated page keywords"
    );

    PageAggregate {
        page: page.to_string(),
        region,
        records,
        prev_records,
        best_query,
        prev_best_query,
        buckets,
        unbucketed,
        zero_click,
        totals,
    }
}

impl PageAggregate {
    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn region(&self) -> Option<RegionCode> {
        self.region
    }

    pub fn records(&self) -> &[KeywordRecord] {
        &self.records
    }

    pub fn prev_records(&self) -> &[KeywordRecord] {
        &self.prev_records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [KeywordRecord] {
        &mut self.records
    }

    pub(crate) fn prev_records_mut(&mut self) -> &mut [KeywordRecord] {
        &mut self.prev_records
    }

    pub fn best_query(&self) -> Option<&KeywordRecord> {
        self.best_query.map(|index| &self.records[index])
    }

    pub fn prev_best_query(&self) -> Option<&KeywordRecord> {
        self.prev_best_query.map(|index| &self.prev_records[index])
    }

    pub fn bucket(&self, label: BucketLabel) -> Vec<&KeywordRecord> {
        self.buckets
            .get(&label)
            .map(|indices| self.resolve(indices))
            .unwrap_or_default()
    }

    pub fn buckets(&self) -> impl Iterator<Item = (BucketLabel, Vec<&KeywordRecord>)> + '_ {
        self.buckets
            .iter()
            .map(|(label, indices)| (*label, self.resolve(indices)))
    }

    pub fn unbucketed(&self) -> Vec<&KeywordRecord> {
        self.resolve(&self.unbucketed)
    }

    pub fn zero_click_keywords(&self) -> Vec<&KeywordRecord> {
        self.resolve(&self.zero_click)
    }

    pub fn ranked_records(&self) -> Vec<&KeywordRecord> {
        self.buckets
            .iter()
            .filter(|(label, _)| label.is_first_page())
            .flat_map(|(_, indices)| self.resolve(indices))
            .collect()
    }

    pub fn prev_records_ranked(&self) -> Vec<&KeywordRecord> {
        let mut ranked = self.prev_records.iter().collect::<Vec<&KeywordRecord>>();
        ranked.sort_by(|a, b| compare_for_listing(a, b));
        ranked
    }

    pub fn totals(&self) -> &PageTotals {
        &self.totals
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            page: self.page.clone(),
            region: self.region,
            best_query: self.best_query().cloned(),
            prev_best_query: self.prev_best_query().cloned(),
            bucket_counts: self
                .buckets
                .iter()
                .map(|(label, indices)| (label.to_string(), indices.len()))
                .collect(),
            unbucketed_count: self.unbucketed.len(),
            zero_click_count: self.zero_click.len(),
            totals: self.totals.clone(),
        }
    }

    fn resolve(&self, indices: &[usize]) -> Vec<&KeywordRecord> {
        indices.iter().map(|index| &self.records[*index]).collect()
    }
}

fn dedup_by_normalized_key(records: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
    let mut positions = HashMap::<NormalizedKey, usize>::new();
    let mut kept = Vec::<KeywordRecord>::with_capacity(records.len());

    for record in records {
        let key = normalize(&record.keyword);
        if key.is_empty() {
            debug!(keyword = %record.keyword, "skipping record with empty keyword");
            continue;
        }

        let existing = positions.get(&key).copied();
        let Some(index) = existing else {
            positions.insert(key, kept.len());
            kept.push(record);
            continue;
        };

        if compare_significance(&record, &kept[index]) == Ordering::Greater {
            debug!(
                key = %key,
                kept = %record.keyword,
                dropped = %kept[index].keyword,
                "replaced duplicate keyword with more significant observation"
            );
            kept[index] = record;
        }
    }

    kept
}

fn compare_significance(a: &KeywordRecord, b: &KeywordRecord) -> Ordering {
    a.impressions_or_zero()
        .total_cmp(&b.impressions_or_zero())
        .then_with(|| a.clicks_or_zero().total_cmp(&b.clicks_or_zero()))
}

// Clicks descending, then better (lower) rank; a missing rank sorts last.
fn compare_by_clicks_then_rank(a: &KeywordRecord, b: &KeywordRecord) -> Ordering {
    b.clicks_or_zero()
        .total_cmp(&a.clicks_or_zero())
        .then_with(|| {
            a.rank
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.rank.unwrap_or(f64::INFINITY))
        })
}

fn compare_for_listing(a: &KeywordRecord, b: &KeywordRecord) -> Ordering {
    compare_by_clicks_then_rank(a, b).then_with(|| a.keyword.cmp(&b.keyword))
}

fn select_best(
    records: &[KeywordRecord],
    candidates: impl IntoIterator<Item = usize>,
) -> Option<usize> {
    candidates
        .into_iter()
        .min_by(|a, b| {
            compare_by_clicks_then_rank(&records[*a], &records[*b]).then_with(|| a.cmp(b))
        })
}

fn compute_totals(
    records: &[KeywordRecord],
    buckets: &BTreeMap<BucketLabel, Vec<usize>>,
) -> PageTotals {
    let total_keywords = records.len();
    let mut keywords_1to10_count = 0;
    let mut keywords_4to10_count = 0;
    let mut potential_traffic = 0.0;

    for (label, indices) in buckets {
        if label.is_first_page() {
            keywords_1to10_count += indices.len();
        }
        if label.is_near_miss() {
            keywords_4to10_count += indices.len();
            potential_traffic += indices
                .iter()
                .map(|index| records[*index].clicks_or_zero())
                .sum::<f64>();
        }
    }

    PageTotals {
        total_clicks: records.iter().map(KeywordRecord::clicks_or_zero).sum(),
        total_impressions: records.iter().map(KeywordRecord::impressions_or_zero).sum(),
        keywords_1to10_count,
        keywords_4to10_count,
        total_keywords,
        potential_traffic,
        keywords_1to10_ratio: format_ratio(keywords_1to10_count, total_keywords),
        keywords_4to10_ratio: format_ratio(keywords_4to10_count, total_keywords),
    }
}

pub fn format_ratio(count: usize, total: usize) -> Option<String> {
    if total == 0 {
        return None;
    }

    Some(format!("{:.1}%", count as f64 / total as f64 * 100.0))
}
