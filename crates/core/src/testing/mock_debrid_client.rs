//! Mock debrid client for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::MAGNET_PREFIX;
use crate::debrid::{AddMagnetResult, DebridClient, DebridError};

/// Mock implementation of the DebridClient trait.
///
/// Records every submitted magnet (accepted or not) and can be told to
/// reject specific infohashes.
#[derive(Debug, Clone, Default)]
pub struct MockDebridClient {
    /// Magnets passed to add_magnet, in call order.
    submitted: Arc<RwLock<Vec<String>>>,
    /// Infohashes that will be rejected.
    failing: Arc<RwLock<HashSet<String>>>,
}

impl MockDebridClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject future submissions of `infohash`.
    pub async fn fail_for(&self, infohash: &str) {
        self.failing.write().await.insert(infohash.to_string());
    }

    /// All magnets passed to add_magnet, in call order.
    pub async fn submitted_magnets(&self) -> Vec<String> {
        self.submitted.read().await.clone()
    }
}

#[async_trait]
impl DebridClient for MockDebridClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_magnet(&self, magnet_uri: &str) -> Result<AddMagnetResult, DebridError> {
        let call = {
            let mut submitted = self.submitted.write().await;
            submitted.push(magnet_uri.to_string());
            submitted.len()
        };

        let infohash = magnet_uri.strip_prefix(MAGNET_PREFIX).unwrap_or(magnet_uri);
        if self.failing.read().await.contains(infohash) {
            return Err(DebridError::ApiError {
                status: 503,
                message: format!("mock rejection of {}", infohash),
            });
        }

        Ok(AddMagnetResult {
            id: format!("MOCK{}", call),
            uri: None,
        })
    }
}
