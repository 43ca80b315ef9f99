#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use paperlens_core::SessionEvent;
use paperlens_domain::{ClientConfig, TokenPair};
use paperlens_infra::PaperLensClient;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const POLL_INTERVAL_MS: u64 = 10;

/// Config pointing at `server`, tokens in memory, fast polling.
pub fn test_config(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.api.base_url = server.uri();
    config.api.timeout_secs = 5;
    config.polling.interval_ms = POLL_INTERVAL_MS;
    config.storage.token_path = None;
    config
}

pub fn client_for(server: &MockServer) -> PaperLensClient {
    PaperLensClient::new(test_config(server)).expect("client should build")
}

/// Client that already holds `access`/`refresh` tokens.
pub async fn logged_in_client(server: &MockServer, access: &str, refresh: &str) -> PaperLensClient {
    let client = client_for(server);
    client
        .http()
        .tokens()
        .save(TokenPair::new(access, refresh))
        .await
        .expect("tokens should be stored");
    client
}

/// `{code, message, data}` envelope around `data`.
pub fn envelope(data: Value) -> Value {
    json!({"code": 0, "message": "ok", "data": data})
}

pub fn token_body(access: &str, refresh: &str) -> Value {
    json!({"access_token": access, "refresh_token": refresh, "token_type": "bearer"})
}

pub fn user_body() -> Value {
    json!({
        "id": 42,
        "email": "reader@example.org",
        "state": "active",
        "created_at": "2024-03-01T08:00:00"
    })
}

pub fn paper_body(arxiv_id: &str) -> Value {
    json!({
        "arxiv_id": arxiv_id,
        "title": format!("Paper {arxiv_id}"),
        "authors": ["A. Author", "B. Author"],
        "summary": "We study things.",
        "published": "2023-01-02",
        "pdf_url": format!("https://arxiv.org/pdf/{arxiv_id}"),
        "categories": ["cs.LG"],
        "entry_id": format!("http://arxiv.org/abs/{arxiv_id}")
    })
}

/// Drain every event currently buffered on `events`.
pub fn drain_events(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

/// Responds with `responses[n]` on the n-th call, repeating the last one.
#[derive(Clone)]
pub struct Sequence {
    responses: Arc<Vec<ResponseTemplate>>,
    calls: Arc<AtomicUsize>,
}

impl Sequence {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        assert!(!responses.is_empty(), "sequence needs at least one response");
        Self { responses: Arc::new(responses), calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.responses.len() - 1);
        self.responses[index].clone()
    }
}

pub fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}
