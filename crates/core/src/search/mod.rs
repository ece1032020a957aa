//! Keyword search over a torrent catalog.
//!
//! Queries are split on whitespace into terms and matched as substrings of
//! the torrent name. How terms combine is the [`TermMatch`] policy; results
//! are deduplicated by infohash and keep match order (no ranking).

mod types;

pub use types::*;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{NameFilter, TorrentCatalog};

/// Split a query into its whitespace-separated terms, in order.
pub fn split_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_string).collect()
}

/// Search engine holding a shared handle to the catalog.
pub struct SearchEngine {
    catalog: Arc<dyn TorrentCatalog>,
    policy: TermMatch,
}

impl SearchEngine {
    /// Create an engine using the default [`TermMatch::AnyTermMatches`] policy.
    pub fn new(catalog: Arc<dyn TorrentCatalog>) -> Self {
        Self {
            catalog,
            policy: TermMatch::default(),
        }
    }

    /// Set the term combination policy.
    pub fn with_policy(mut self, policy: TermMatch) -> Self {
        self.policy = policy;
        self
    }

    /// Search torrent names, surfacing query failures.
    ///
    /// A query without terms matches nothing.
    pub fn try_search_title(
        &self,
        query: &str,
        case_sensitive: bool,
    ) -> Result<SearchResult, SearchError> {
        let terms = split_terms(query);
        if terms.is_empty() {
            debug!("Empty query, nothing to search");
            return Ok(SearchResult::empty());
        }

        let matches = match self.policy {
            TermMatch::AnyTermMatches => {
                let mut matches = Vec::new();
                for term in &terms {
                    let filter = NameFilter::single(term.clone(), case_sensitive);
                    let found = self.catalog.find_by_name(&filter).map_err(|e| {
                        SearchError::Query {
                            term: term.clone(),
                            message: e.to_string(),
                        }
                    })?;
                    debug!(term = %term, matches = found.len(), "Term searched");
                    matches.extend(found);
                }
                matches
            }
            TermMatch::AllTermsMatch => {
                let filter = NameFilter::all(terms.clone(), case_sensitive);
                self.catalog
                    .find_by_name(&filter)
                    .map_err(|e| SearchError::Query {
                        term: terms.join(" "),
                        message: e.to_string(),
                    })?
            }
        };

        Ok(SearchResult::from_matches(matches))
    }

    /// Search torrent names; a failed query is logged and yields no results.
    pub fn search_title(&self, query: &str, case_sensitive: bool) -> SearchResult {
        match self.try_search_title(query, case_sensitive) {
            Ok(result) => {
                info!(
                    query,
                    engine = self.catalog.engine(),
                    found = result.len(),
                    "Search finished"
                );
                result
            }
            Err(e) => {
                warn!(
                    query,
                    engine = self.catalog.engine(),
                    error = %e,
                    "Search failed, returning no results"
                );
                SearchResult::empty()
            }
        }
    }

    /// Release the catalog handle. Safe to call repeatedly.
    pub fn close(&self) {
        self.catalog.close();
    }
}
