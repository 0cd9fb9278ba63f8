//! Fake search API server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /search` — index listing from the [`Catalog`]
//! - `POST /search/{index}?q=&rows=&start=` — partial search with the JSON
//!   projection as body
//!
//! The transport under test blocks on its own runtime, so the server runs on
//! a dedicated thread with a separate tokio runtime instead of inside the
//! test's async context. Tests are plain `#[test]` functions.
//!
//! # Example
//!
//! ```rust,no_run
//! use common::fake_search_api::FakeSearchApi;
//!
//! let api = FakeSearchApi::start(chef_catalog());
//! let transport = HttpTransport::new(&api.base_url(), Duration::from_secs(5)).unwrap();
//! ```

use super::fixtures::Catalog;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A request as the server saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedRequest {
    pub method: String,
    /// Path and query string, still encoded.
    pub uri: String,
    pub user_agent: Option<String>,
    pub headers: HashMap<String, String>,
    pub payload: Option<Value>,
}

/// State shared between the router and test code.
struct ApiState {
    catalog: Mutex<Catalog>,
    requests: Mutex<Vec<ServedRequest>>,
    /// Queued raw responses, one per request, served before the catalog.
    overrides: Mutex<VecDeque<(StatusCode, String)>>,
}

/// Handle to the running fake search API server.
pub struct FakeSearchApi {
    addr: SocketAddr,
    state: Arc<ApiState>,
}

impl FakeSearchApi {
    /// Start the server on a random port. Returns once the listener is bound.
    pub fn start(catalog: Catalog) -> Self {
        let state = Arc::new(ApiState {
            catalog: Mutex::new(catalog),
            requests: Mutex::default(),
            overrides: Mutex::default(),
        });

        let (tx, rx) = std::sync::mpsc::channel();
        let server_state = Arc::clone(&state);
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("fake search api runtime");
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake search api");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("report fake search api address");

                let app = Router::new()
                    .route("/search", get(list_indexes))
                    .route("/search/{index}", post(search))
                    .with_state(server_state);
                axum::serve(listener, app).await.expect("fake search api stopped");
            });
        });

        let addr = rx.recv().expect("fake search api failed to start");
        Self { addr, state }
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer the next request with `status` and `body` instead of the catalog.
    pub fn fail_next(&self, status: u16, body: &str) {
        self.respond_next(status, body);
    }

    /// Answer the next request with a raw `body` (as `text/plain`), whatever
    /// the status. Use it for 2xx replies the client cannot decode.
    pub fn respond_next(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.state
            .overrides
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
    }

    /// Swap the served catalog; later searches see the new documents.
    pub fn replace_catalog(&self, catalog: Catalog) {
        *self.state.catalog.lock().unwrap() = catalog;
    }

    /// Every request served so far, in arrival order.
    pub fn requests(&self) -> Vec<ServedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

fn record(state: &ApiState, method: &str, uri: &Uri, headers: &HeaderMap, payload: Option<Value>) {
    let header_map = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect::<HashMap<_, _>>();
    state.requests.lock().unwrap().push(ServedRequest {
        method: method.to_string(),
        uri: uri.to_string(),
        user_agent: header_map.get("user-agent").cloned(),
        headers: header_map,
        payload,
    });
}

fn queued_override(state: &ApiState) -> Option<Response> {
    let (status, body) = state.overrides.lock().unwrap().pop_front()?;
    Some((status, body).into_response())
}

async fn list_indexes(State(state): State<Arc<ApiState>>, uri: Uri, headers: HeaderMap) -> Response {
    record(&state, "GET", &uri, &headers, None);
    if let Some(reply) = queued_override(&state) {
        return reply;
    }
    let listing = state.catalog.lock().unwrap().listing();
    Json(listing).into_response()
}

async fn search(
    State(state): State<Arc<ApiState>>,
    Path(index): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
    Json(projection): Json<Value>,
) -> Response {
    record(&state, "POST", &uri, &headers, Some(projection.clone()));
    if let Some(reply) = queued_override(&state) {
        return reply;
    }

    let q = params.get("q").map(String::as_str).unwrap_or("*:*");
    let rows = params.get("rows").and_then(|r| r.parse().ok()).unwrap_or(1000);
    let start = params.get("start").and_then(|s| s.parse().ok()).unwrap_or(0);

    let result = state
        .catalog
        .lock()
        .unwrap()
        .search(&index, q, rows, start, &projection);
    match result {
        Some(page) => Json(page).into_response(),
        None => (StatusCode::NOT_FOUND, format!("index {index} not found")).into_response(),
    }
}
