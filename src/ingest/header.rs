use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankColumn {
    Keyword,
    CurrentPosition,
    CurrentTraffic,
    PreviousPosition,
    PreviousTraffic,
    Volume,
    Country,
    CurrentUrl,
}

impl RankColumn {
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Keyword => &["keyword", "query", "keywords"],
            Self::CurrentPosition => &["current position", "position"],
            Self::CurrentTraffic => &["current organic traffic", "organic traffic", "traffic"],
            Self::PreviousPosition => &["previous position"],
            Self::PreviousTraffic => &["previous organic traffic"],
            Self::Volume => &["volume", "search volume"],
            Self::Country => &["country", "location"],
            Self::CurrentUrl => &["current url", "url"],
        }
    }
}

// One per sheet; lookups are memoized per column.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    header: Vec<String>,
    resolved: HashMap<RankColumn, Option<usize>>,
}

impl HeaderIndex {
    pub fn new(header: &[String]) -> Self {
        Self {
            header: header.iter().map(|name| normalize_header(name)).collect(),
            resolved: HashMap::new(),
        }
    }

    pub fn column(&mut self, column: RankColumn) -> Option<usize> {
        if let Some(resolved) = self.resolved.get(&column) {
            return *resolved;
        }

        let position = column
            .aliases()
            .iter()
            .find_map(|alias| self.header.iter().position(|name| name == alias));
        self.resolved.insert(column, position);
        position
    }

    pub fn cached_lookups(&self) -> usize {
        self.resolved.len()
    }
}

fn normalize_header(name: &str) -> String {
    name.trim_matches(|ch: char| ch.is_whitespace() || ch == '\u{FEFF}')
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}
