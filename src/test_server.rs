//! In-process mock notification endpoint for the sink tests
//!
//! Mirrors what a real subscriber does: checks the media type, decodes the
//! envelope and answers with the status requested through `?status=`.

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_TYPE, LOCATION},
    },
    routing::post,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::types::{Action, EVENTS_MEDIA_TYPE, Envelope, Event, Target};

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<AtomicUsize>,
    events: Arc<AtomicUsize>,
    last_headers: Arc<Mutex<Option<HeaderMap>>>,
}

pub struct MockEndpoint {
    addr: SocketAddr,
    state: MockState,
}

impl MockEndpoint {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/", post(receive))
            .route("/stall", post(stall))
            .route("/redirect", post(redirect))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind");
        let addr = listener.local_addr().expect("failed to get addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock endpoint failed");
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn url_with_status(&self, status: u16) -> String {
        format!("http://{}/?status={}", self.addr, status)
    }

    /// Accepts the request and never answers in time
    pub fn stall_url(&self) -> String {
        format!("http://{}/stall", self.addr)
    }

    /// Answers 307 pointing back at `/`
    pub fn redirect_url(&self) -> String {
        format!("http://{}/redirect", self.addr)
    }

    /// Requests that carried a valid envelope
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> usize {
        self.state.events.load(Ordering::SeqCst)
    }

    pub fn last_headers(&self) -> Option<HeaderMap> {
        self.state.last_headers.lock().unwrap().clone()
    }
}

async fn receive(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    *state.last_headers.lock().unwrap() = Some(headers.clone());

    let content_types: Vec<_> = headers.get_all(CONTENT_TYPE).iter().collect();
    if content_types.len() != 1 || content_types[0] != EVENTS_MEDIA_TYPE {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE;
    }

    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(_) => return StatusCode::BAD_REQUEST,
    };

    state.requests.fetch_add(1, Ordering::SeqCst);
    state.events.fetch_add(envelope.events.len(), Ordering::SeqCst);

    // Let caller choose the status
    params
        .get("status")
        .and_then(|s| s.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK)
}

async fn stall() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(30)).await;
    StatusCode::OK
}

async fn redirect() -> (StatusCode, [(axum::http::HeaderName, &'static str); 1]) {
    (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, "/")])
}

/// A URL nothing is listening on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("failed to get addr");
    drop(listener);
    format!("http://{}/", addr)
}

/// Client that talks to the loopback mock directly, ignoring proxy settings
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build client")
}

pub fn test_event(action: &str, repo: &str, target_type: &str) -> Event {
    let action: Action = action.parse().expect("valid action");
    Event::new(action, Target::new(target_type, repo))
}
