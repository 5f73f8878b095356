use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::aggregate::PageAggregate;
use crate::keyword::{NormalizedKey, normalize};
use crate::model::{CoverageEntry, KeywordRecord};


#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageJoin {
    pub covered: Vec<CoverageEntry>,
    pub uncovered: Vec<CoverageEntry>,
    pub zero_volume: Vec<CoverageEntry>,
}

impl CoverageJoin {
    pub fn entry_count(&self) -> usize {
        self.covered.len() + self.uncovered.len()
    }
}

pub fn join(aggregate: &mut PageAggregate, coverage: &[CoverageEntry]) -> CoverageJoin {
    let (order, by_key) = index_coverage(coverage);

    let enriched = enrich_records(aggregate.records_mut(), &by_key)
        + enrich_records(aggregate.prev_records_mut(), &by_key);

    let present = aggregate
        .records()
        .iter()
        .map(|record| normalize(&record.keyword))
        .collect::<HashSet<NormalizedKey>>();

    let mut result = CoverageJoin::default();
    for key in order {
        let Some(&entry) = by_key.get(&key) else {
            continue;
        };

        if entry.search_volume == Some(0.0) {
            result.zero_volume.push(entry.clone());
        }
        if present.contains(&key) {
            result.covered.push(entry.clone());
        } else {
            result.uncovered.push(entry.clone());
        }
    }

    debug!(
        page = aggregate.page(),
        covered = result.covered.len(),
        uncovered = result.uncovered.len(),
        zero_volume = result.zero_volume.len(),
        enriched,
        "joined coverage entries"
    );

    result
}

// First-seen key order is kept for output; on collision the higher search
// volume wins and an unknown volume loses to any known one.
fn index_coverage(
    coverage: &[CoverageEntry],
) -> (Vec<NormalizedKey>, HashMap<NormalizedKey, &CoverageEntry>) {
    let mut order = Vec::new();
    let mut by_key = HashMap::<NormalizedKey, &CoverageEntry>::new();

    for entry in coverage {
        let key = normalize(&entry.text);
        if key.is_empty() {
            continue;
        }

        let replace = match by_key.get(&key) {
            Some(existing) => has_higher_volume(entry, existing),
            None => {
                order.push(key.clone());
                true
            }
        };
        if replace {
            by_key.insert(key, entry);
        }
    }

    (order, by_key)
}

fn has_higher_volume(candidate: &CoverageEntry, existing: &CoverageEntry) -> bool {
    match (candidate.search_volume, existing.search_volume) {
        (Some(candidate), Some(existing)) => candidate > existing,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn enrich_records(
    records: &mut [KeywordRecord],
    by_key: &HashMap<NormalizedKey, &CoverageEntry>,
) -> usize {
    let mut enriched = 0;
    for record in records.iter_mut().filter(|record| record.search_volume.is_none()) {
        let volume = by_key
            .get(&normalize(&record.keyword))
            .and_then(|entry| entry.search_volume);
        if volume.is_some() {
            record.search_volume = volume;
            enriched += 1;
        }
    }
    enriched
}
