//! Shared test helpers for `auditdesk-core` integration tests.
//!
//! Lightweight in-memory collaborators so pipeline tests can focus on
//! behaviour instead of wiring.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use auditdesk_core::http::{
    ApiDispatcher, HttpTransport, RetryPolicy, TransportError, TransportRequest, TransportResponse,
};
use auditdesk_core::session::{Navigator, Notifier, SessionRefresher, TokenStore};
use auditdesk_domain::{ApiError, ClientConfig, UserInfo};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

type Handler = dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync;

/// Transport answering through a closure and recording every request.
pub struct MockTransport {
    handler: Box<Handler>,
    sent: Mutex<Vec<(Instant, TransportRequest)>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&TransportRequest) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self { handler: Box::new(handler), sent: Mutex::new(Vec::new()) })
    }

    pub fn sent(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn send_times(&self) -> Vec<Instant> {
        self.sent.lock().iter().map(|(at, _)| *at).collect()
    }

    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.sent
            .lock()
            .iter()
            .map(|(_, req)| req.header("Authorization").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let result = (self.handler)(&request);
        self.sent.lock().push((Instant::now(), request));
        result
    }
}

/// Token store, navigator and notifier in one recorder
#[derive(Default)]
pub struct MockSession {
    token: Mutex<Option<String>>,
    refresh_token: Mutex<Option<String>>,
    user: Mutex<Option<UserInfo>>,
    permissions: Mutex<Vec<String>>,
    path: Mutex<String>,
    pushes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MockSession {
    pub fn with_token(token: &str) -> Arc<Self> {
        let session = Self::default();
        *session.token.lock() = Some(token.to_string());
        *session.path.lock() = "/products".to_string();
        Arc::new(session)
    }

    pub fn set_path(&self, path: &str) {
        *self.path.lock() = path.to_string();
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl TokenStore for MockSession {
    fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.refresh_token.lock().clone()
    }

    fn set_token(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
    }

    fn set_refresh_token(&self, refresh_token: &str) {
        *self.refresh_token.lock() = Some(refresh_token.to_string());
    }

    fn user(&self) -> Option<UserInfo> {
        self.user.lock().clone()
    }

    fn set_user(&self, user: &UserInfo) {
        *self.user.lock() = Some(user.clone());
    }

    fn permissions(&self) -> Vec<String> {
        self.permissions.lock().clone()
    }

    fn set_permissions(&self, permissions: &[String]) {
        *self.permissions.lock() = permissions.to_vec();
    }

    fn clear(&self) {
        *self.token.lock() = None;
        *self.refresh_token.lock() = None;
        *self.user.lock() = None;
        self.permissions.lock().clear();
    }
}

impl Navigator for MockSession {
    fn current_path(&self) -> String {
        self.path.lock().clone()
    }

    fn push(&self, path: &str) {
        self.pushes.lock().push(path.to_string());
        *self.path.lock() = path.to_string();
    }
}

impl Notifier for MockSession {
    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn success(&self, _message: &str) {}
}

/// Refresher that blocks until released, then writes `new_token` (or fails).
pub struct GatedRefresher {
    session: Arc<MockSession>,
    new_token: Option<String>,
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedRefresher {
    pub fn succeeding(session: Arc<MockSession>, new_token: &str) -> Arc<Self> {
        Arc::new(Self {
            session,
            new_token: Some(new_token.to_string()),
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(session: Arc<MockSession>) -> Arc<Self> {
        Arc::new(Self { session, new_token: None, gate: Notify::new(), calls: AtomicUsize::new(0) })
    }

    /// Let the pending (or next) refresh complete
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionRefresher for GatedRefresher {
    async fn refresh_token_action(&self) -> Result<bool, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        match &self.new_token {
            Some(token) => {
                self.session.set_token(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Dispatcher wired to the mocks with the default retry policy
pub fn dispatcher(
    transport: Arc<MockTransport>,
    session: Arc<MockSession>,
    refresher: Arc<GatedRefresher>,
) -> ApiDispatcher {
    dispatcher_with_retry(transport, session, refresher, RetryPolicy::default())
}

pub fn dispatcher_with_retry(
    transport: Arc<MockTransport>,
    session: Arc<MockSession>,
    refresher: Arc<GatedRefresher>,
    retry: RetryPolicy,
) -> ApiDispatcher {
    ApiDispatcher::builder()
        .transport(transport)
        .token_store(session.clone())
        .navigator(session.clone())
        .notifier(session)
        .refresher(refresher)
        .config(ClientConfig::with_base_url("http://api.test"))
        .retry_policy(retry)
        .build()
        .unwrap()
}

/// `{success: true, data}` envelope
pub fn ok_json(data: serde_json::Value) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::json(200, &serde_json::json!({"code": 200, "success": true, "data": data})))
}

pub fn status(code: u16) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::json(code, &serde_json::json!({})))
}
