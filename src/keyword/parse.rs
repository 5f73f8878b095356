use anyhow::{Context, Result};
use regex::{Captures, Regex};

use crate::model::KeywordRecord;

pub const GRAMMAR_VERSION: u32 = 1;

const NUMBER: &str = r"([0-9][0-9,]*(?:\.[0-9]+)?|[^,()]*?)";

#[derive(Debug)]
pub struct EntryParser {
    extended_with_ctr: Regex,
    extended: Regex,
    legacy_clicks: Regex,
}

impl EntryParser {
    pub fn new() -> Result<Self> {
        let click = format!(r"\(\s*clicks?\s*[:：]\s*{NUMBER}\s*,");
        let impression = format!(r"\s*impressions?\s*[:：]\s*{NUMBER}\s*,");
        let position = format!(r"\s*position\s*[:：]\s*{NUMBER}\s*");

        Ok(Self {
            extended_with_ctr: Regex::new(&format!(
                r"(?is)^(.*?)\s*{click}{impression}{position},\s*ctr\s*[:：]\s*{NUMBER}\s*%?\s*\)\s*$"
            ))
            .context("failed to compile extended keyword regex with ctr")?,
            extended: Regex::new(&format!(r"(?is)^(.*?)\s*{click}{impression}{position}\)\s*$"))
                .context("failed to compile extended keyword regex")?,
            legacy_clicks: Regex::new(r"(?s)^(.*?)\s*\(\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*\)\s*$")
                .context("failed to compile legacy clicks regex")?,
        })
    }

    pub fn parse_entry(&self, raw_fragment: &str) -> KeywordRecord {
        let fragment = raw_fragment.trim();

        if let Some(captures) = self.extended_with_ctr.captures(fragment) {
            return KeywordRecord::new(capture_keyword(&captures))
                .with_clicks(capture_number(&captures, 2))
                .with_impressions(capture_number(&captures, 3))
                .with_rank(capture_number(&captures, 4))
                .with_ctr(capture_number(&captures, 5))
                .with_derived_ctr();
        }

        if let Some(captures) = self.extended.captures(fragment) {
            return KeywordRecord::new(capture_keyword(&captures))
                .with_clicks(capture_number(&captures, 2))
                .with_impressions(capture_number(&captures, 3))
                .with_rank(capture_number(&captures, 4))
                .with_derived_ctr();
        }

        if let Some(captures) = self.legacy_clicks.captures(fragment) {
            return KeywordRecord::new(capture_keyword(&captures))
                .with_clicks(capture_number(&captures, 2));
        }

        let keyword = fragment
            .split_once('(')
            .map(|(head, _)| head)
            .unwrap_or(fragment);
        KeywordRecord::new(keyword.trim())
    }

    pub fn parse_entries(&self, raw: &str) -> Vec<KeywordRecord> {
        split_entries(raw)
            .iter()
            .map(|fragment| self.parse_entry(fragment))
            .filter(|record| !record.keyword.is_empty())
            .collect()
    }
}

// Entries may contain commas themselves, so only "), " counts as a boundary.
pub fn split_entries(raw: &str) -> Vec<String> {
    let mut entries = Vec::new();

    for line in raw.lines() {
        let pieces = line.split("), ").collect::<Vec<&str>>();
        let last_index = pieces.len().saturating_sub(1);

        for (index, piece) in pieces.into_iter().enumerate() {
            let entry = if index < last_index {
                format!("{piece})")
            } else {
                piece.to_string()
            };
            let entry = entry.trim();
            if !entry.is_empty() {
                entries.push(entry.to_string());
            }
        }
    }

    entries
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect::<String>();
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn capture_keyword(captures: &Captures<'_>) -> String {
    captures
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn capture_number(captures: &Captures<'_>, index: usize) -> Option<f64> {
    captures.get(index).and_then(|m| parse_number(m.as_str()))
}
