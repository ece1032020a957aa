//! Torrent catalog - the local store the CSV snapshot is loaded into.
//!
//! Every engine offers the same contract: insert-or-ignore keyed on the
//! infohash, atomic bulk loads, substring matching on the name, and an
//! idempotent close.

mod csv;
mod memory;
mod sqlite;
mod types;

pub use self::csv::CSV_FIELDS;
pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;
pub use types::*;

use std::path::Path;

/// Trait for torrent catalog storage.
pub trait TorrentCatalog: Send + Sync {
    /// Engine name for logging.
    fn engine(&self) -> &'static str;

    /// Load a CSV snapshot into the catalog.
    ///
    /// Rows are inserted with insert-or-ignore semantics: a row whose
    /// infohash is already known is skipped, never overwritten. Invalid rows
    /// are rejected individually and reported. All inserts are committed
    /// together when the whole file has been read.
    fn bulk_insert(&self, csv_path: &Path) -> Result<InsertReport, CatalogError>;

    /// Insert already-parsed records with the same insert-or-ignore semantics.
    ///
    /// Returns the number of records that were new.
    fn insert(&self, records: &[TorrentRecord]) -> Result<u64, CatalogError>;

    /// Records whose name contains every term of `filter`, in insertion order.
    ///
    /// An empty filter matches nothing.
    fn find_by_name(&self, filter: &NameFilter) -> Result<Vec<TorrentRecord>, CatalogError>;

    /// Get a record by infohash.
    fn get(&self, infohash: &str) -> Result<Option<TorrentRecord>, CatalogError>;

    /// Number of stored records.
    fn count(&self) -> Result<u64, CatalogError>;

    /// Release the underlying storage. Calling it again is a no-op.
    fn close(&self);

    /// Whether [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;
}
