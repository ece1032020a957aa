//! Source feed fetching.
//!
//! Downloads the catalog CSV snapshot to disk unchanged; parsing happens
//! later in the catalog.

mod http;

pub use http::HttpFetcher;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout")]
    Timeout,

    #[error("I/O error writing {path}: {message}")]
    Io { path: String, message: String },
}

/// Trait for snapshot sources.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Download `url` into `dest`, replacing any existing file.
    ///
    /// Returns the number of bytes written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}
