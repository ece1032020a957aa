//! In-memory torrent catalog.
//!
//! Same contract as the SQLite engine, without persistence. Case folding is
//! ASCII-only so matches agree with SQLite's `LOWER`.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use tracing::info;

use super::csv::ingest_csv;
use super::{CatalogError, InsertReport, NameFilter, TorrentCatalog, TorrentRecord};

#[derive(Debug, Default)]
struct MemoryState {
    /// Records in insertion order.
    records: Vec<TorrentRecord>,
    known: HashSet<String>,
}

impl MemoryState {
    /// Append everything staged by a successful load.
    fn commit(&mut self, staged: Vec<TorrentRecord>) {
        for record in staged {
            self.known.insert(record.infohash.clone());
            self.records.push(record);
        }
    }
}

/// Stages new records while a load is in progress.
#[derive(Default)]
struct Staging {
    records: Vec<TorrentRecord>,
    hashes: HashSet<String>,
}

impl Staging {
    fn offer(&mut self, state: &MemoryState, record: &TorrentRecord) -> bool {
        if state.known.contains(&record.infohash) || self.hashes.contains(&record.infohash) {
            return false;
        }
        self.hashes.insert(record.infohash.clone());
        self.records.push(record.clone());
        true
    }
}

/// In-memory torrent catalog.
#[derive(Debug)]
pub struct MemoryCatalog {
    /// `None` once closed.
    state: Mutex<Option<MemoryState>>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Some(MemoryState::default())),
        }
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut MemoryState) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| CatalogError::Database("catalog lock poisoned".to_string()))?;
        let state = guard.as_mut().ok_or(CatalogError::Closed)?;
        f(state)
    }
}

fn contains_term(name: &str, term: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        name.contains(term)
    } else {
        name.to_ascii_lowercase()
            .contains(&term.to_ascii_lowercase())
    }
}

impl TorrentCatalog for MemoryCatalog {
    fn engine(&self) -> &'static str {
        "memory"
    }

    fn bulk_insert(&self, csv_path: &Path) -> Result<InsertReport, CatalogError> {
        self.with_state(|state| {
            let mut staging = Staging::default();
            let report = ingest_csv(csv_path, |record| Ok(staging.offer(state, record)))?;
            state.commit(staging.records);

            info!(
                csv = %csv_path.display(),
                attempted = report.attempted,
                inserted = report.inserted,
                ignored = report.ignored,
                rejected = report.rejected,
                "Bulk insert committed"
            );
            Ok(report)
        })
    }

    fn insert(&self, records: &[TorrentRecord]) -> Result<u64, CatalogError> {
        self.with_state(|state| {
            for record in records {
                record
                    .check_storable()
                    .map_err(|reason| CatalogError::invalid_record(record, reason))?;
            }

            let mut staging = Staging::default();
            let new_count = records
                .iter()
                .filter(|record| staging.offer(state, record))
                .count();
            state.commit(staging.records);
            Ok(new_count as u64)
        })
    }

    fn find_by_name(&self, filter: &NameFilter) -> Result<Vec<TorrentRecord>, CatalogError> {
        if filter.terms.is_empty() {
            return Ok(Vec::new());
        }

        self.with_state(|state| {
            Ok(state
                .records
                .iter()
                .filter(|record| {
                    filter
                        .terms
                        .iter()
                        .all(|term| contains_term(&record.name, term, filter.case_sensitive))
                })
                .cloned()
                .collect())
        })
    }

    fn get(&self, infohash: &str) -> Result<Option<TorrentRecord>, CatalogError> {
        self.with_state(|state| {
            Ok(state
                .records
                .iter()
                .find(|record| record.infohash == infohash)
                .cloned())
        })
    }

    fn count(&self) -> Result<u64, CatalogError> {
        self.with_state(|state| Ok(state.records.len() as u64))
    }

    fn close(&self) {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.take();
    }

    fn is_closed(&self) -> bool {
        self.state
            .lock()
            .map(|guard| guard.is_none())
            .unwrap_or(true)
    }
}
