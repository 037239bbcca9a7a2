#![allow(dead_code)]

use std::sync::Arc;

use auditdesk_core::session::Notifier;
use auditdesk_core::LoadingTracker;
use auditdesk_domain::{ClientConfig, RetrySettings, RunMode};
use auditdesk_infra::{ApiClient, MemoryNavigator, MemoryTokenStore};
use parking_lot::Mutex;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Notifier that records every message for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.successes.lock().push(message.to_string());
    }
}

/// A client wired to a wiremock server, with every collaborator observable.
pub struct TestBackend {
    pub server: MockServer,
    pub client: ApiClient,
    pub tokens: Arc<MemoryTokenStore>,
    pub navigator: Arc<MemoryNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub loading: Arc<LoadingTracker>,
}

impl TestBackend {
    /// Fresh backend with no stored credentials, starting on `/products`.
    pub async fn start() -> Self {
        Self::start_with(MemoryTokenStore::new()).await
    }

    pub async fn start_with(tokens: MemoryTokenStore) -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig {
            mode: RunMode::Test,
            base_url: Some(format!("{}/api", server.uri())),
            request_timeout_ms: 2_000,
            retry: RetrySettings { max_retries: 2, base_delay_ms: 10, retry_server_errors: true },
            redirect_debounce_ms: 20,
            ..ClientConfig::default()
        };

        let tokens = Arc::new(tokens);
        let navigator = Arc::new(MemoryNavigator::new("/products"));
        let notifier = Arc::new(RecordingNotifier::default());
        let loading = Arc::new(LoadingTracker::new());

        let client = ApiClient::builder()
            .config(config)
            .token_store(tokens.clone())
            .navigator(navigator.clone())
            .notifier(notifier.clone())
            .loading_tracker(Arc::clone(&loading))
            .build()
            .expect("client should build");

        Self { server, client, tokens, navigator, notifier, loading }
    }

    /// Sign the client in with the given access and refresh tokens.
    pub fn signed_in(self, token: &str, refresh_token: &str) -> Self {
        use auditdesk_core::session::TokenStore;

        self.tokens.set_token(token);
        self.tokens.set_refresh_token(refresh_token);
        self
    }

    /// Wait long enough for a scheduled login redirect to fire.
    pub async fn settle_redirect(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
}

/// Success envelope around `data`.
pub fn envelope(data: Value) -> Value {
    json!({
        "code": 200,
        "message": "操作成功",
        "data": data,
        "success": true,
        "timestamp": 1_700_000_000_000_i64
    })
}

/// Failure envelope with an explicit code and message.
pub fn failure(code: Value, message: &str) -> Value {
    json!({ "code": code, "message": message, "success": false })
}
