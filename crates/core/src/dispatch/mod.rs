//! Dispatch of search results to a debrid service.
//!
//! Walks a bounded slice of a search result, builds a magnet URI per record
//! and, when submission is enabled, hands it to the debrid client. A failed
//! submission is recorded and the loop moves on.

mod types;

pub use types::*;

use std::ops::Range;
use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::TorrentRecord;
use crate::debrid::DebridClient;

/// Clamp `[start, end)` to a result of `len` records. Yields an empty range
/// when `start` is past the end or `end <= start`.
pub fn clamp_range(len: usize, start: usize, end: usize) -> Range<usize> {
    let end = end.min(len);
    if start >= end {
        return start.min(len)..start.min(len);
    }
    start..end
}

/// Runs the dispatch loop against an optional debrid client.
#[derive(Clone, Default)]
pub struct Dispatcher {
    client: Option<Arc<dyn DebridClient>>,
    on_item: Option<DispatchProgressCallback>,
}

impl Dispatcher {
    /// Dispatcher able to submit through `client`.
    pub fn new(client: Arc<dyn DebridClient>) -> Self {
        Self {
            client: Some(client),
            on_item: None,
        }
    }

    /// Dispatcher without a client; only preview runs are possible.
    pub fn preview_only() -> Self {
        Self::default()
    }

    /// Set a callback invoked after each processed record.
    pub fn with_progress(mut self, callback: DispatchProgressCallback) -> Self {
        self.on_item = Some(callback);
        self
    }

    /// Process `results[start..end]` (with `end` clamped to the length).
    ///
    /// With `submit` false no external call is made. Items are processed
    /// strictly one after another.
    pub async fn dispatch(
        &self,
        results: &[TorrentRecord],
        start: usize,
        end: usize,
        submit: bool,
    ) -> Result<DispatchReport, DispatchError> {
        let client = match (submit, &self.client) {
            (true, Some(client)) => Some(client.as_ref()),
            (true, None) => return Err(DispatchError::ClientUnavailable),
            (false, _) => None,
        };

        let range = clamp_range(results.len(), start, end);
        let mut report = DispatchReport {
            range: range.clone(),
            submit,
            items: Vec::with_capacity(range.len()),
        };

        if range.is_empty() {
            return Ok(report);
        }

        info!(
            from = range.start,
            to = range.end - 1,
            submit,
            "Dispatching results"
        );

        for (index, record) in results.iter().enumerate().take(range.end).skip(range.start) {
            let magnet_uri = record.magnet_uri();

            let outcome = match client {
                None => DispatchOutcome::Previewed,
                Some(client) => match client.add_magnet(&magnet_uri).await {
                    Ok(added) => {
                        info!(index, infohash = %record.infohash, id = %added.id, "Magnet submitted");
                        DispatchOutcome::Submitted { id: added.id }
                    }
                    Err(e) => {
                        warn!(
                            index,
                            infohash = %record.infohash,
                            backend = client.name(),
                            error = %e,
                            "Magnet submission failed"
                        );
                        DispatchOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                },
            };

            let item = DispatchItem {
                index,
                infohash: record.infohash.clone(),
                magnet_uri,
                outcome,
            };
            if let Some(callback) = &self.on_item {
                callback(&item);
            }
            report.items.push(item);
        }

        info!(
            processed = report.items.len(),
            submitted = report.submitted(),
            failed = report.failed(),
            "Dispatch complete"
        );
        Ok(report)
    }
}
