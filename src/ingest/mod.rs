use std::collections::HashMap;

use anyhow::{Result, bail};
use serde_json::Value;
use tracing::debug;

use crate::aggregate::BucketLabel;
use crate::keyword::{EntryParser, parse_number};
use crate::model::{CoverageEntry, KeywordRecord, RankExportSheet, SearchConsolePage};

mod header;

pub use header::{HeaderIndex, RankColumn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageInputs {
    pub page: String,
    pub current: Vec<KeywordRecord>,
    pub previous: Vec<KeywordRecord>,
    pub volumes: Vec<CoverageEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct RankExportIngest {
    pub pages: Vec<PageInputs>,
    pub skipped_rows: usize,
}

pub fn canonical_page_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or_default();
    let stripped = without_fragment.trim_end_matches('/');

    if stripped.is_empty() || stripped.ends_with(':') {
        without_fragment.to_string()
    } else {
        stripped.to_string()
    }
}

pub fn ingest_rank_export(
    sheet: &RankExportSheet,
    headers: &mut HeaderIndex,
) -> Result<RankExportIngest> {
    let Some(keyword_column) = headers.column(RankColumn::Keyword) else {
        bail!("rank export is missing a Keyword column");
    };
    let Some(url_column) = headers.column(RankColumn::CurrentUrl) else {
        bail!("rank export is missing a Current URL column");
    };

    let mut grouped = PageGrouping::default();
    let mut skipped_rows = 0;

    for (row_index, row) in sheet.rows.iter().enumerate() {
        let keyword = row.get(keyword_column).and_then(cell_text);
        let page = row
            .get(url_column)
            .and_then(cell_text)
            .map(|url| canonical_page_url(&url))
            .filter(|url| !url.is_empty());
        let (Some(keyword), Some(page)) = (keyword, page) else {
            debug!(row = row_index + 1, "skipping rank export row without keyword or url");
            skipped_rows += 1;
            continue;
        };

        let country = row_text(row, headers, RankColumn::Country);
        let current_position = row_number(row, headers, RankColumn::CurrentPosition);
        let current_traffic = row_number(row, headers, RankColumn::CurrentTraffic);
        let previous_position = row_number(row, headers, RankColumn::PreviousPosition);
        let previous_traffic = row_number(row, headers, RankColumn::PreviousTraffic);
        let volume = row_number(row, headers, RankColumn::Volume);

        let inputs = grouped.page_mut(&page);
        inputs.current.push(
            KeywordRecord::new(keyword.clone())
                .with_rank(current_position)
                .with_clicks(current_traffic)
                .with_country(country.clone()),
        );
        if previous_position.is_some() || previous_traffic.is_some() {
            inputs.previous.push(
                KeywordRecord::new(keyword.clone())
                    .with_rank(previous_position)
                    .with_clicks(previous_traffic)
                    .with_country(country),
            );
        }
        if volume.is_some() {
            inputs.volumes.push(CoverageEntry::new(keyword, volume));
        }
    }

    Ok(RankExportIngest {
        pages: grouped.into_pages(),
        skipped_rows,
    })
}

pub fn ingest_search_console(parser: &EntryParser, page: &SearchConsolePage) -> PageInputs {
    let mut current = Vec::new();
    if let Some(best_query) = page.best_query.as_deref() {
        current.extend(parser.parse_entries(best_query));
    }

    for (label, entries) in &page.rank_buckets {
        let bucket_rank = BucketLabel::parse(label).map(BucketLabel::nominal_rank);
        for mut record in parser.parse_entries(entries) {
            if record.rank.is_none() {
                record.rank = bucket_rank;
            }
            current.push(record);
        }
    }

    let previous = page
        .prev_best_query
        .as_deref()
        .map(|entries| parser.parse_entries(entries))
        .unwrap_or_default();

    PageInputs {
        page: canonical_page_url(&page.page),
        current,
        previous,
        volumes: Vec::new(),
    }
}

// Pages keep the order in which they were first seen across sources.
pub fn merge_page_inputs(sources: impl IntoIterator<Item = PageInputs>) -> Vec<PageInputs> {
    let mut grouped = PageGrouping::default();
    for source in sources {
        let inputs = grouped.page_mut(&source.page);
        inputs.current.extend(source.current);
        inputs.previous.extend(source.previous);
        inputs.volumes.extend(source.volumes);
    }
    grouped.into_pages()
}

#[derive(Debug, Default)]
struct PageGrouping {
    positions: HashMap<String, usize>,
    pages: Vec<PageInputs>,
}

impl PageGrouping {
    fn page_mut(&mut self, page: &str) -> &mut PageInputs {
        let index = match self.positions.get(page).copied() {
            Some(index) => index,
            None => {
                self.positions.insert(page.to_string(), self.pages.len());
                self.pages.push(PageInputs {
                    page: page.to_string(),
                    ..PageInputs::default()
                });
                self.pages.len() - 1
            }
        };
        &mut self.pages[index]
    }

    fn into_pages(self) -> Vec<PageInputs> {
        self.pages
    }
}

fn row_text(row: &[Value], headers: &mut HeaderIndex, column: RankColumn) -> Option<String> {
    headers
        .column(column)
        .and_then(|index| row.get(index))
        .and_then(cell_text)
}

fn row_number(row: &[Value], headers: &mut HeaderIndex, column: RankColumn) -> Option<f64> {
    headers
        .column(column)
        .and_then(|index| row.get(index))
        .and_then(cell_number)
}

fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn cell_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|number| number.is_finite()),
        Value::String(text) => match text.trim() {
            "" | "-" | "—" | "n/a" | "N/A" => None,
            trimmed => parse_number(trimmed),
        },
        _ => None,
    }
}
