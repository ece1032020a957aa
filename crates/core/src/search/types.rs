//! Types for catalog search.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::TorrentRecord;

/// How the terms of a multi-word query are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TermMatch {
    /// A record matches when its name contains any one of the terms. Each
    /// term is queried on its own and the results are unioned in term order.
    #[default]
    AnyTermMatches,
    /// A record matches only when its name contains every term.
    AllTermsMatch,
}

/// Ordered search results, at most one entry per infohash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchResult {
    records: Vec<TorrentRecord>,
}

impl SearchResult {
    /// Collapse `matches` to one entry per infohash, keeping the first one
    /// seen and otherwise preserving order.
    pub fn from_matches(matches: impl IntoIterator<Item = TorrentRecord>) -> Self {
        let mut seen = HashSet::new();
        let records = matches
            .into_iter()
            .filter(|record| seen.insert(record.infohash.clone()))
            .collect();
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TorrentRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TorrentRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[TorrentRecord] {
        &self.records
    }
}

impl IntoIterator for SearchResult {
    type Item = TorrentRecord;
    type IntoIter = std::vec::IntoIter<TorrentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a TorrentRecord;
    type IntoIter = std::slice::Iter<'a, TorrentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Errors for search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The underlying catalog query failed for `term`.
    #[error("Query for '{term}' failed: {message}")]
    Query { term: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::torrent_record;

    #[test]
    fn test_term_match_serialization() {
        assert_eq!(
            serde_json::to_string(&TermMatch::AnyTermMatches).unwrap(),
            "\"any_term_matches\""
        );
        assert_eq!(
            serde_json::to_string(&TermMatch::AllTermsMatch).unwrap(),
            "\"all_terms_match\""
        );
    }

    #[test]
    fn test_term_match_default() {
        assert_eq!(TermMatch::default(), TermMatch::AnyTermMatches);
    }

    #[test]
    fn test_from_matches_keeps_first_seen() {
        let mut later = torrent_record("aaa", "Later copy");
        later.seeders = 42;
        let result = SearchResult::from_matches(vec![
            torrent_record("bbb", "B"),
            torrent_record("aaa", "A"),
            torrent_record("bbb", "B again"),
            later,
        ]);

        let names: Vec<&str> = result.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_empty_result() {
        let result = SearchResult::empty();
        assert!(result.is_empty());
        assert!(result.get(0).is_none());
        assert_eq!(serde_json::to_string(&result).unwrap(), "[]");
    }
}
