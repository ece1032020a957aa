//! Types for the dispatch loop.

use std::ops::Range;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// What happened to one dispatched record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Submission disabled; the magnet URI was only built.
    Previewed,
    /// The debrid service accepted the magnet.
    Submitted { id: String },
    /// The debrid service refused the magnet or could not be reached.
    Failed { reason: String },
}

/// One processed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchItem {
    /// Position in the search result.
    pub index: usize,
    pub infohash: String,
    pub magnet_uri: String,
    pub outcome: DispatchOutcome,
}

/// Result of one dispatch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Effective range after clamping to the result length.
    pub range: Range<usize>,
    pub submit: bool,
    pub items: Vec<DispatchItem>,
}

impl DispatchReport {
    /// True when the range selected no records.
    pub fn nothing_to_dispatch(&self) -> bool {
        self.items.is_empty()
    }

    pub fn submitted(&self) -> usize {
        self.count(|o| matches!(o, DispatchOutcome::Submitted { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DispatchOutcome::Failed { .. }))
    }

    pub fn previewed(&self) -> usize {
        self.count(|o| matches!(o, DispatchOutcome::Previewed))
    }

    fn count(&self, pred: impl Fn(&DispatchOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

/// Called after every processed record (used for progress display).
pub type DispatchProgressCallback = Arc<dyn Fn(&DispatchItem) + Send + Sync>;

/// Errors that stop a dispatch before any record is processed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Submission requested but no debrid client is configured")]
    ClientUnavailable,
}
