//! Types for debrid service operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to a debrid service.
#[derive(Debug, Error)]
pub enum DebridError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result of submitting a magnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMagnetResult {
    /// Identifier the service assigned to the torrent.
    pub id: String,
    /// Service URL of the torrent resource, if returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Trait for debrid service backends.
#[async_trait]
pub trait DebridClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Submit a magnet URI for remote download.
    async fn add_magnet(&self, magnet_uri: &str) -> Result<AddMagnetResult, DebridError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_magnet_result_without_uri() {
        let result: AddMagnetResult = serde_json::from_str(r#"{"id": "ABC123"}"#).unwrap();
        assert_eq!(result.id, "ABC123");
        assert!(result.uri.is_none());
    }

    #[test]
    fn test_api_error_display() {
        let err = DebridError::ApiError {
            status: 503,
            message: "service_unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 503): service_unavailable");
    }
}
