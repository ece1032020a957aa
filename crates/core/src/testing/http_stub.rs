//! Canned-response HTTP server for exercising the HTTP clients.

use std::io;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A response the stub will send.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: "application/octet-stream".to_string(),
            body,
        }
    }
}

impl IntoResponse for StubResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Default)]
struct StubState {
    responses: Vec<StubResponse>,
    served: usize,
    requests: Vec<RecordedRequest>,
}

type SharedState = Arc<Mutex<StubState>>;

/// Serves the configured responses in request order; the last response is
/// repeated once the list is exhausted.
pub struct StubServer {
    url: String,
    state: SharedState,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(responses: Vec<StubResponse>) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        let state = Arc::new(Mutex::new(StubState {
            responses,
            ..StubState::default()
        }));

        let app = Router::new()
            .fallback(respond)
            .with_state(Arc::clone(&state));
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { url, state, task })
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().await;
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let response = state
        .responses
        .get(state.served)
        .or(state.responses.last())
        .cloned();
    state.served += 1;

    match response {
        Some(response) => response.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_responses_in_request_order() {
        let server = StubServer::start(vec![
            StubResponse::json(201, r#"{"id": "1"}"#),
            StubResponse::json(503, "{}"),
        ])
        .await
        .unwrap();
        let client = reqwest::Client::new();

        let mut statuses = Vec::new();
        for n in 0..3 {
            let response = client
                .post(format!("{}/items/{}", server.url(), n))
                .header("X-Item", n.to_string())
                .body(format!("item={}", n))
                .send()
                .await
                .unwrap();
            statuses.push(response.status().as_u16());
        }

        assert_eq!(statuses, vec![201, 503, 503]);
        let requests = server.requests().await;
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].method, "POST");
        assert_eq!(requests[1].path, "/items/1");
        assert_eq!(requests[1].header("x-item"), Some("1"));
        assert_eq!(requests[2].body, "item=2");
    }

    #[tokio::test]
    async fn test_without_responses_returns_not_found() {
        let server = StubServer::start(Vec::new()).await.unwrap();

        let response = reqwest::get(format!("{}/anything", server.url()))
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        assert_eq!(server.requests().await.len(), 1);
    }
}
