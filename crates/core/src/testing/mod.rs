//! Testing utilities and mock implementations.
//!
//! Mocks for the external capabilities (debrid service, snapshot source), a
//! canned-response HTTP server for the HTTP clients, and record/CSV fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use debrify_core::testing::{fixtures, MockDebridClient};
//!
//! let client = Arc::new(MockDebridClient::new());
//! client.fail_for("deadbeef...").await;
//!
//! let dispatcher = Dispatcher::new(client.clone());
//! dispatcher.dispatch(&results, 0, 10, true).await?;
//!
//! assert_eq!(client.submitted_magnets().await.len(), 10);
//! ```

mod http_stub;
mod mock_debrid_client;
mod mock_fetcher;

pub use http_stub::{RecordedRequest, StubResponse, StubServer};
pub use mock_debrid_client::MockDebridClient;
pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::catalog::{TorrentRecord, CSV_FIELDS};

    /// Deterministic 40-hex-char infohash for `n`.
    pub fn infohash(n: u32) -> String {
        format!("{:040x}", n)
    }

    /// Create a test record with reasonable defaults.
    pub fn torrent_record(infohash: &str, name: &str) -> TorrentRecord {
        TorrentRecord {
            infohash: infohash.to_string(),
            name: name.to_string(),
            size_bytes: 1024 * 1024 * 700, // 700 MB
            created_unix: 1_700_000_000,
            seeders: 25,
            leechers: 4,
            completed: 310,
            scraped_date: "2024-03-01".to_string(),
            published: "2023-11-14".to_string(),
        }
    }

    /// The snapshot header line (no trailing newline).
    pub fn csv_header() -> String {
        CSV_FIELDS.join(",")
    }

    /// One CSV line for `record`, quoting text fields when needed.
    pub fn csv_line(record: &TorrentRecord) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            quote(&record.infohash),
            quote(&record.name),
            record.size_bytes,
            record.created_unix,
            record.seeders,
            record.leechers,
            record.completed,
            quote(&record.scraped_date),
            quote(&record.published),
        )
    }

    /// A full snapshot (header plus one line per record).
    pub fn catalog_csv(records: &[TorrentRecord]) -> String {
        let mut csv = csv_header();
        csv.push('\n');
        for record in records {
            csv.push_str(&csv_line(record));
            csv.push('\n');
        }
        csv
    }

    /// Write `contents` to `dir/name` and return the path.
    pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    fn quote(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}
