use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Word to count mapping, as served by `GET /word-counts`.
///
/// Backed by a `BTreeMap` so the JSON output is deterministic; readers that
/// care about ranking should use [`TallyTable::ranked`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TallyTable(BTreeMap<String, u64>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub word: String,
    pub count: u64,
}

/// Aggregate figures derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallStats {
    pub total_words: u64,
    pub unique_words: usize,
    pub top: Vec<RankedEntry>,
}

impl TallyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.0.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.0.values().fold(0u64, |acc, c| acc.saturating_add(*c))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries by count descending, ties broken by word ascending.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        let mut entries: Vec<RankedEntry> = self
            .0
            .iter()
            .map(|(word, count)| RankedEntry { word: word.clone(), count: *count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        entries
    }

    pub fn stats(&self, limit: usize) -> WallStats {
        let mut top = self.ranked();
        top.truncate(limit);
        WallStats { total_words: self.total(), unique_words: self.len(), top }
    }
}

impl FromIterator<(String, u64)> for TallyTable {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
