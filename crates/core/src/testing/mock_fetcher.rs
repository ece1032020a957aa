//! Mock snapshot source for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, SourceFetcher};

/// Mock implementation of the SourceFetcher trait.
///
/// Writes a fixed payload to the destination and records requested URLs.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    payload: Arc<RwLock<Vec<u8>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Fetcher that serves `payload` for any URL.
    pub fn serving(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Arc::new(RwLock::new(payload.into())),
            fetched: Arc::default(),
        }
    }

    /// Replace the served payload.
    pub async fn set_payload(&self, payload: impl Into<Vec<u8>>) {
        *self.payload.write().await = payload.into();
    }

    /// URLs requested so far.
    pub async fn fetched_urls(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }
}

#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        self.fetched.write().await.push(url.to_string());

        let payload = self.payload.read().await.clone();
        tokio::fs::write(dest, &payload)
            .await
            .map_err(|e| FetchError::Io {
                path: dest.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(payload.len() as u64)
    }
}
