//! HTTP snapshot fetcher.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::{FetchError, SourceFetcher};

/// Streams a remote file to disk chunk by chunk.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher. `connect_timeout` bounds connecting only; snapshots
    /// can take minutes to transfer.
    pub fn new(connect_timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

fn io_error(path: &Path, e: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let mut file = File::create(dest).await.map_err(|e| io_error(dest, e))?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| io_error(dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| io_error(dest, e))?;

        info!(url, dest = %dest.display(), bytes = written, "Snapshot downloaded");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubResponse, StubServer};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_writes_bytes_unchanged() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
        let server = StubServer::start(vec![StubResponse::bytes(200, payload.clone())])
            .await
            .unwrap();
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested/dir/torrents.csv");

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let written = fetcher
            .fetch(&format!("{}/torrents.csv", server.url()), &dest)
            .await
            .unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
        assert_eq!(server.requests().await[0].path, "/torrents.csv");
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let server = StubServer::start(vec![StubResponse::json(404, "{}")])
            .await
            .unwrap();
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("torrents.csv");

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher.fetch(server.url(), &dest).await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
        assert!(!dest.exists());
    }
}
