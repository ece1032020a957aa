//! Real-Debrid client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::DebridConfig;

use super::{AddMagnetResult, DebridClient, DebridError};

/// Body of a successful `torrents/addMagnet` call.
#[derive(Debug, Deserialize)]
struct AddMagnetResponse {
    id: String,
    #[serde(default)]
    uri: Option<String>,
}

/// Error body returned by the REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    #[serde(default)]
    error_code: Option<i64>,
}

/// Real-Debrid REST client.
///
/// The API token is handed over once at construction and only ever sent as
/// a bearer header.
pub struct RealDebridClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl RealDebridClient {
    /// Create a new Real-Debrid client.
    pub fn new(config: DebridConfig) -> Result<Self, DebridError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| DebridError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
        })
    }

    fn map_request_error(e: reqwest::Error) -> DebridError {
        if e.is_timeout() {
            DebridError::Timeout
        } else if e.is_connect() {
            DebridError::ConnectionFailed(e.to_string())
        } else {
            DebridError::ApiError {
                status: e.status().map(|s| s.as_u16()).unwrap_or_default(),
                message: e.to_string(),
            }
        }
    }
}

/// Human-readable detail from an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error,
            error_code: Some(code),
        }) => format!("{} (code {})", error, code),
        Ok(ApiErrorBody { error, .. }) => error,
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.chars().take(200).collect(),
    }
}

#[async_trait]
impl DebridClient for RealDebridClient {
    fn name(&self) -> &str {
        "real-debrid"
    }

    async fn add_magnet(&self, magnet_uri: &str) -> Result<AddMagnetResult, DebridError> {
        let url = format!("{}/torrents/addMagnet", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .form(&[("magnet", magnet_uri)])
            .send()
            .await
            .map_err(Self::map_request_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DebridError::InvalidResponse(e.to_string()))?;

        if status.is_success() {
            let parsed: AddMagnetResponse = serde_json::from_str(&body)
                .map_err(|e| DebridError::InvalidResponse(format!("{}: {}", e, body)))?;
            debug!(id = %parsed.id, "Magnet accepted by Real-Debrid");
            return Ok(AddMagnetResult {
                id: parsed.id,
                uri: parsed.uri,
            });
        }

        let detail = error_detail(&body);
        match status.as_u16() {
            401 => Err(DebridError::AuthenticationFailed(detail)),
            code => Err(DebridError::ApiError {
                status: code,
                message: detail,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubResponse, StubServer};

    const MAGNET: &str = "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567";

    fn client_for(server: &StubServer) -> RealDebridClient {
        RealDebridClient::new(DebridConfig {
            api_token: "test-token".to_string(),
            base_url: format!("{}/", server.url()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"error": "bad_token", "error_code": 8}"#),
            "bad_token (code 8)"
        );
        assert_eq!(error_detail(r#"{"error": "bad_token"}"#), "bad_token");
        assert_eq!(error_detail(""), "empty response");
        assert_eq!(error_detail("Service down"), "Service down");
    }

    #[tokio::test]
    async fn test_add_magnet_success() {
        let server = StubServer::start(vec![StubResponse::json(
            201,
            r#"{"id": "RDID42", "uri": "https://api.real-debrid.com/rest/1.0/torrents/info/RDID42"}"#,
        )])
        .await
        .unwrap();
        let client = client_for(&server);

        let result = client.add_magnet(MAGNET).await.unwrap();
        assert_eq!(result.id, "RDID42");
        assert!(result.uri.unwrap().ends_with("/RDID42"));

        let requests = server.requests().await;
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/torrents/addMagnet");
        assert_eq!(request.header("authorization"), Some("Bearer test-token"));
        assert!(request.body.starts_with("magnet=magnet%3A%3Fxt%3Durn%3Abtih%3A"));
    }

    #[tokio::test]
    async fn test_add_magnet_unauthorized() {
        let server = StubServer::start(vec![StubResponse::json(
            401,
            r#"{"error": "bad_token", "error_code": 8}"#,
        )])
        .await
        .unwrap();

        let result = client_for(&server).add_magnet(MAGNET).await;
        match result {
            Err(DebridError::AuthenticationFailed(msg)) => assert_eq!(msg, "bad_token (code 8)"),
            other => panic!("expected authentication failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_magnet_api_error() {
        let server = StubServer::start(vec![StubResponse::json(
            503,
            r#"{"error": "service_unavailable", "error_code": 25}"#,
        )])
        .await
        .unwrap();

        let result = client_for(&server).add_magnet(MAGNET).await;
        assert!(matches!(
            result,
            Err(DebridError::ApiError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_add_magnet_garbage_success_body() {
        let server = StubServer::start(vec![StubResponse::json(201, "not json")])
            .await
            .unwrap();

        let result = client_for(&server).add_magnet(MAGNET).await;
        assert!(matches!(result, Err(DebridError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_add_magnet_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = RealDebridClient::new(DebridConfig {
            api_token: "t".to_string(),
            base_url: format!("http://127.0.0.1:{}", port),
            timeout_secs: 5,
        })
        .unwrap();

        let result = client.add_magnet(MAGNET).await;
        assert!(matches!(result, Err(DebridError::ConnectionFailed(_))));
    }
}
