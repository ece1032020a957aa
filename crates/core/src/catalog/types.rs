//! Types for the torrent catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of every magnet URI built from an infohash.
pub const MAGNET_PREFIX: &str = "magnet:?xt=urn:btih:";

/// One catalog entry (one row per unique infohash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentRecord {
    /// Info hash, stored exactly as ingested.
    pub infohash: String,
    /// Torrent name.
    pub name: String,
    /// Total size in bytes.
    pub size_bytes: u64,
    /// Creation time (epoch seconds).
    pub created_unix: i64,
    pub seeders: u32,
    pub leechers: u32,
    /// Historical completed-download counter.
    pub completed: u64,
    /// When the swarm was last scraped (ISO date).
    pub scraped_date: String,
    /// Publication date or free text.
    pub published: String,
}

impl TorrentRecord {
    /// Magnet URI referencing this torrent by infohash.
    pub fn magnet_uri(&self) -> String {
        magnet_uri(&self.infohash)
    }

    /// Creation time as a timestamp, if representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_unix, 0)
    }

    /// Check that the unsigned counters fit a signed 64-bit SQLite INTEGER.
    pub fn check_storable(&self) -> Result<(), RowError> {
        for (field, value) in [
            ("size_bytes", self.size_bytes),
            ("completed", self.completed),
        ] {
            if i64::try_from(value).is_err() {
                return Err(RowError::OutOfRange { field, value });
            }
        }
        Ok(())
    }
}

/// Build `magnet:?xt=urn:btih:<infohash>`.
pub fn magnet_uri(infohash: &str) -> String {
    format!("{}{}", MAGNET_PREFIX, infohash)
}

/// Name filter passed to a catalog engine: every term must be contained in
/// the record name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    pub terms: Vec<String>,
    pub case_sensitive: bool,
}

impl NameFilter {
    /// Filter matching names that contain a single term.
    pub fn single(term: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            terms: vec![term.into()],
            case_sensitive,
        }
    }

    /// Filter matching names that contain all of `terms`.
    pub fn all(terms: Vec<String>, case_sensitive: bool) -> Self {
        Self {
            terms,
            case_sensitive,
        }
    }
}

/// Why a CSV row was rejected during bulk insert.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}' is not a valid integer: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}' is out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },

    #[error("unreadable row: {message}")]
    Malformed { message: String },
}

/// A rejected CSV row (the `RowRejected` diagnostic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    /// 1-based line number in the CSV file (the header is line 1).
    pub line: u64,
    /// Infohash of the row, when it could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infohash: Option<String>,
    pub reason: RowError,
}

/// Outcome of one bulk insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsertReport {
    /// Data rows read from the CSV.
    pub attempted: u64,
    /// Rows that created a new record.
    pub inserted: u64,
    /// Valid rows whose infohash was already known.
    pub ignored: u64,
    /// Rows that failed validation.
    pub rejected: u64,
    pub rejections: Vec<RowRejection>,
}

impl InsertReport {
    pub(crate) fn record_rejection(&mut self, rejection: RowRejection) {
        self.rejected += 1;
        self.rejections.push(rejection);
    }
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Record {infohash} cannot be stored: {reason}")]
    InvalidRecord { infohash: String, reason: RowError },

    #[error("Catalog is closed")]
    Closed,
}

impl CatalogError {
    pub(crate) fn invalid_record(record: &TorrentRecord, reason: RowError) -> Self {
        CatalogError::InvalidRecord {
            infohash: record.infohash.clone(),
            reason,
        }
    }
}
