//! API client facade
//!
//! Wires the core dispatcher to concrete adapters and hands out the typed
//! resource APIs.

use std::future::Future;
use std::sync::Arc;

use auditdesk_core::http::{ApiDispatcher, ApiRequest, HttpTransport, RetryPolicy};
use auditdesk_core::session::{Navigator, Notifier, SessionRefresher, TokenStore};
use auditdesk_core::LoadingTracker;
use auditdesk_domain::{ApiError, ApiResponse, ClientConfig, ConfigError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use super::audits::AuditsApi;
use super::auth::AuthApi;
use super::documents::DocumentsApi;
use super::products::ProductsApi;
use super::rules::RulesApi;
use crate::http::HttpClient;
use crate::session::{EndpointRefresher, MemoryNavigator, MemoryTokenStore, TracingNotifier};

/// Entry point for talking to the AuditDesk backend
#[derive(Clone)]
pub struct ApiClient {
    dispatcher: Arc<ApiDispatcher>,
    tokens: Arc<dyn TokenStore>,
    loading: Arc<LoadingTracker>,
    config: ClientConfig,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Client with default adapters: reqwest transport, in-memory tokens,
    /// log-only notifications and the process-wide loading tracker.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    pub fn dispatcher(&self) -> &Arc<ApiDispatcher> {
        &self.dispatcher
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn loading(&self) -> &Arc<LoadingTracker> {
        &self.loading
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        self.dispatcher.notifier()
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi::new(self)
    }

    pub fn rules(&self) -> RulesApi<'_> {
        RulesApi::new(self)
    }

    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi::new(self)
    }

    pub fn audits(&self) -> AuditsApi<'_> {
        AuditsApi::new(self)
    }

    /// Send an arbitrary request and decode its envelope.
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.dispatcher.request(request).await
    }

    /// Send a request expecting a binary body.
    ///
    /// # Errors
    /// Typed error from the dispatcher.
    pub async fn download(&self, request: &ApiRequest) -> Result<Vec<u8>, ApiError> {
        self.dispatcher.download(request).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(&ApiRequest::get(path)).await
    }

    /// # Errors
    /// Typed error from the dispatcher, or a validation error if `body`
    /// cannot be serialized.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(&ApiRequest::post(path).json(body)?).await
    }

    /// # Errors
    /// Typed error from the dispatcher, or a validation error if `body`
    /// cannot be serialized.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(&ApiRequest::put(path).json(body)?).await
    }

    /// # Errors
    /// Typed error from the dispatcher.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(&ApiRequest::delete(path)).await
    }

    /// Run `op` with the loading flag `key` raised
    pub(crate) async fn tracked<F, Fut, T>(&self, key: &str, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.loading.track(key, op).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("dispatcher", &self.dispatcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`]. Every collaborator is optional and falls back
/// to a default adapter.
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    tokens: Option<Arc<dyn TokenStore>>,
    refresher: Option<Arc<dyn SessionRefresher>>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
    loading: Option<Arc<LoadingTracker>>,
    retry: Option<RetryPolicy>,
}

impl ApiClientBuilder {
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    #[must_use]
    pub fn refresher(mut self, refresher: Arc<dyn SessionRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Use a private loading tracker instead of the process-wide one
    #[must_use]
    pub fn loading_tracker(mut self, loading: Arc<LoadingTracker>) -> Self {
        self.loading = Some(loading);
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// # Errors
    /// Returns error if the default HTTP client cannot be created.
    pub fn build(self) -> Result<ApiClient, ConfigError> {
        let config = self.config;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = HttpClient::builder();
                if let Some(agent) = &config.user_agent {
                    builder = builder.user_agent(agent.clone());
                }
                Arc::new(builder.build()?)
            }
        };
        let tokens: Arc<dyn TokenStore> =
            self.tokens.unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let refresher = self.refresher.unwrap_or_else(|| {
            Arc::new(EndpointRefresher::new(Arc::clone(&transport), Arc::clone(&tokens), &config))
        });
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(MemoryNavigator::default()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier));

        let mut dispatcher = ApiDispatcher::builder()
            .transport(transport)
            .token_store(Arc::clone(&tokens))
            .refresher(refresher)
            .navigator(navigator)
            .notifier(notifier)
            .config(config.clone());
        if let Some(retry) = self.retry {
            dispatcher = dispatcher.retry_policy(retry);
        }
        let dispatcher = Arc::new(dispatcher.build()?);

        debug!(base_url = dispatcher.base_url(), mode = ?config.mode, "api client ready");

        Ok(ApiClient {
            dispatcher,
            tokens,
            loading: self.loading.unwrap_or_else(LoadingTracker::global),
            config,
        })
    }
}
