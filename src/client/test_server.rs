//! Scripted HTTP server for client tests
//!
//! Answers every request with the next canned `(status, body)` pair and
//! records what it was sent. Once the script runs out, the fallback response
//! (if any) is repeated; otherwise the server answers 404.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tokio::sync::oneshot;

use super::ApiClient;

type Canned = (u16, &'static str);

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct ServerState {
    script: Arc<Mutex<VecDeque<Canned>>>,
    fallback: Option<Canned>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub(crate) struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, "id", "key", Duration::from_secs(5))
            .expect("test client")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log").clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Start a server answering with `(status, body)` pairs in order
pub(crate) async fn serve(responses: Vec<Canned>) -> TestServer {
    start(responses, None).await
}

/// Like [`serve`], repeating `fallback` once `responses` are used up
pub(crate) async fn serve_with_fallback(responses: Vec<Canned>, fallback: Canned) -> TestServer {
    start(responses, Some(fallback)).await
}

async fn start(responses: Vec<Canned>, fallback: Option<Canned>) -> TestServer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        script: Arc::new(Mutex::new(responses.into())),
        fallback,
        requests: requests.clone(),
    };

    let app = Router::new().fallback(answer).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("listener addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let _ = server.await;
    });

    TestServer {
        base_url: format!("http://{addr}/api/"),
        requests,
        shutdown_tx: Some(shutdown_tx),
    }
}

async fn answer(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    state.requests.lock().expect("request log").push(RecordedRequest {
        method: method.to_string(),
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let next = state.script.lock().expect("script").pop_front().or(state.fallback);
    let Some((status, body)) = next else {
        return (StatusCode::NOT_FOUND, "no scripted response left").into_response();
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if body.is_empty() {
        return status.into_response();
    }
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
