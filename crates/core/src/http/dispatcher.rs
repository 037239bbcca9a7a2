//! Request dispatcher
//!
//! Runs one logical request through the full pipeline: attach credentials,
//! send, coordinate a token refresh on 401, retry transient failures with
//! exponential backoff, and turn every failure into a typed [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use auditdesk_domain::constants::{messages, HEADER_AUTHORIZATION, HEADER_REQUEST_ID};
use auditdesk_domain::envelope::business_failure;
use auditdesk_domain::{ApiError, ApiResponse, ClientConfig, ConfigError, Envelope, ErrorKind};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::classify::{status_error, transport_error};
use super::ports::{HttpTransport, TransportRequest};
use super::refresh::{RefreshCoordinator, RefreshTicket};
use super::request::{join_url, ApiRequest, ResponseType};
use super::retry::{RetryContext, RetryPolicy};
use crate::session::{Navigator, Notifier, SessionExpiry, SessionRefresher, TokenStore};

/// Successful (2xx) response, body still undecoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Trace identifier sent as `X-Request-Id`
    pub request_id: String,
}

/// The request pipeline shared by every API module
pub struct ApiDispatcher {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    refresher: Arc<dyn SessionRefresher>,
    notifier: Arc<dyn Notifier>,
    expiry: SessionExpiry,
    coordinator: RefreshCoordinator,
    retry: RetryPolicy,
    base_url: String,
    timeout: Duration,
    upload_timeout: Duration,
    refresh_path: String,
}

impl ApiDispatcher {
    pub fn builder() -> ApiDispatcherBuilder {
        ApiDispatcherBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn session_expiry(&self) -> &SessionExpiry {
        &self.expiry
    }

    /// Send a request and decode its JSON envelope.
    ///
    /// # Errors
    /// Any transport, HTTP, business or decoding failure as a typed error.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<ApiResponse<T>, ApiError> {
        let raw = self.execute(request).await?;

        if raw.body.iter().all(u8::is_ascii_whitespace) && raw.status == 204 {
            return Ok(ApiResponse { code: 204, ..ApiResponse::ok(None, "") });
        }

        let decoded = Envelope::<T>::decode(&raw.body).and_then(Envelope::into_result);
        decoded.inspect_err(|err| {
            warn!(
                request_id = %raw.request_id,
                kind = %err.kind,
                code = %err.code,
                "request rejected by envelope"
            );
            self.notify_intercepted(err);
        })
    }

    /// Send a request expecting a binary body.
    ///
    /// A JSON `success: false` envelope in place of the file is surfaced as
    /// a business error.
    ///
    /// # Errors
    /// Any transport, HTTP or business failure as a typed error.
    pub async fn download(&self, request: &ApiRequest) -> Result<Vec<u8>, ApiError> {
        let raw = self.execute(request).await?;

        let looks_like_json = raw.content_type.as_deref().is_some_and(|ct| ct.contains("json"))
            || raw.body.first() == Some(&b'{');
        if looks_like_json {
            if let Some(failure) = business_failure(&raw.body) {
                let err = failure.into_error();
                self.notify_intercepted(&err);
                return Err(err);
            }
        }
        Ok(raw.body)
    }

    /// Run the dispatch loop and return the first 2xx response.
    ///
    /// # Errors
    /// Typed error once refresh or retries can no longer help.
    #[instrument(
        skip(self, request),
        fields(method = %request.method(), path = %request.path(), request_id = tracing::field::Empty)
    )]
    pub async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let mut retry = RetryContext::new(self.retry.max_retries());
        let mut auth_retried = false;
        let mut refreshed_token: Option<String> = None;

        loop {
            let token = refreshed_token.clone().or_else(|| self.tokens.token());
            let wire = self.prepare(request, &request_id, token.as_deref());
            debug!(attempt = retry.attempt() + 1, url = %wire.url, "sending request");

            let response = match self.transport.send(wire).await {
                Ok(response) => response,
                Err(err) => {
                    if let Some(delay) = retry.next_delay(&self.retry) {
                        warn!(
                            attempt = retry.attempt(),
                            max_attempts = retry.max_attempts(),
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "request failed without response, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let classified = transport_error(&err);
                    let surfaced = if retry.attempt() > 0 {
                        ApiError::network(messages::NETWORK_FAILED).with_details(serde_json::json!({
                            "lastError": err.to_string(),
                            "lastKind": classified.kind,
                            "attempts": retry.attempt() + 1,
                            "elapsedMs": retry.elapsed().as_millis() as u64,
                        }))
                    } else {
                        classified
                    };
                    warn!(kind = %surfaced.kind, error = %err, "request failed without response");
                    self.notifier.error(&surfaced.message);
                    return Err(surfaced);
                }
            };

            if response.is_success() {
                debug!(status = response.status, bytes = response.body.len(), "request succeeded");
                return Ok(RawResponse {
                    status: response.status,
                    content_type: response.content_type,
                    body: response.body,
                    request_id,
                });
            }

            if response.status == 401 {
                if request.skips_auth_refresh() {
                    return Err(status_error(401, &response.body));
                }
                if auth_retried || self.is_refresh_path(request.path()) {
                    warn!("request unauthorized after refresh, session expired");
                    self.expiry.expire(messages::SESSION_EXPIRED);
                    return Err(ApiError::session_expired()
                        .with_details(details_of(&response.body)));
                }

                auth_retried = true;

                // Another request may have refreshed while this one was in flight.
                let current = self.tokens.token().filter(|t| !t.is_empty());
                if current.is_some() && current != token {
                    debug!("token changed since this attempt was sent, replaying");
                    refreshed_token = current;
                    continue;
                }

                refreshed_token = Some(self.refresh_access_token().await?);
                continue;
            }

            if self.retry.should_retry_status(response.status) {
                if let Some(delay) = retry.next_delay(&self.retry) {
                    warn!(
                        status = response.status,
                        attempt = retry.attempt(),
                        max_attempts = retry.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "server error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            let err = status_error(response.status, &response.body);
            warn!(status = response.status, kind = %err.kind, "request failed");
            self.notify_intercepted(&err);
            return Err(err);
        }
    }

    /// Obtain a fresh token, either by leading the refresh or by waiting for
    /// the one in flight.
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let lease = match self.coordinator.acquire_or_enqueue() {
            RefreshTicket::Waiter(waiter) => {
                debug!("waiting for in-flight token refresh");
                return waiter.wait().await;
            }
            RefreshTicket::Leader(lease) => lease,
        };

        let outcome = self.run_refresh().await;
        lease.complete(outcome.clone());

        if outcome.is_err() {
            self.expiry.expire(messages::SESSION_EXPIRED);
        }
        outcome
    }

    async fn run_refresh(&self) -> Result<String, ApiError> {
        match self.refresher.refresh_token_action().await {
            Ok(true) => match self.tokens.token().filter(|t| !t.is_empty()) {
                Some(token) => {
                    info!("access token refreshed");
                    Ok(token)
                }
                None => {
                    warn!("refresh reported success but no token is stored");
                    Err(ApiError::session_expired())
                }
            },
            Ok(false) => {
                warn!("token refresh not possible");
                Err(ApiError::session_expired())
            }
            Err(err) => {
                warn!(error = %err, kind = %err.kind, "token refresh failed");
                Err(ApiError::session_expired()
                    .with_details(serde_json::to_value(&err).unwrap_or(Value::Null)))
            }
        }
    }

    fn prepare(&self, request: &ApiRequest, request_id: &str, token: Option<&str>) -> TransportRequest {
        let mut headers = Vec::with_capacity(request.headers().len() + 2);
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.push((HEADER_AUTHORIZATION.to_string(), format!("Bearer {token}")));
        }
        headers.push((HEADER_REQUEST_ID.to_string(), request_id.to_string()));
        headers.extend(request.headers().iter().cloned());

        if request.response_type() == ResponseType::Binary {
            headers.push(("Accept".to_string(), "*/*".to_string()));
        }

        TransportRequest {
            method: request.method(),
            url: join_url(&self.base_url, request.path()),
            query: request.query_params().to_vec(),
            headers,
            body: request.body().clone(),
            timeout: request.timeout_override().unwrap_or(self.timeout),
            progress: request.progress().cloned(),
        }
    }

    fn is_refresh_path(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        path.trim_end_matches('/').ends_with(self.refresh_path.trim_end_matches('/'))
    }

    fn notify_intercepted(&self, err: &ApiError) {
        if err.kind.notifies_on_intercept() {
            self.notifier.error(&err.message);
        } else if err.is(ErrorKind::Validation) {
            debug!(message = %err.message, "validation error left to caller");
        }
    }
}

impl std::fmt::Debug for ApiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDispatcher")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("refresh_path", &self.refresh_path)
            .finish_non_exhaustive()
    }
}

fn details_of(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// Builder for [`ApiDispatcher`]
#[derive(Default)]
pub struct ApiDispatcherBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    tokens: Option<Arc<dyn TokenStore>>,
    refresher: Option<Arc<dyn SessionRefresher>>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
    config: ClientConfig,
    retry: Option<RetryPolicy>,
}

impl ApiDispatcherBuilder {
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

    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the retry policy derived from the config
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// # Errors
    /// [`ConfigError::MissingComponent`] when a collaborator was not supplied.
    pub fn build(self) -> Result<ApiDispatcher, ConfigError> {
        let transport = self.transport.ok_or(ConfigError::MissingComponent("transport"))?;
        let tokens = self.tokens.ok_or(ConfigError::MissingComponent("token store"))?;
        let refresher = self.refresher.ok_or(ConfigError::MissingComponent("refresher"))?;
        let navigator = self.navigator.ok_or(ConfigError::MissingComponent("navigator"))?;
        let notifier = self.notifier.ok_or(ConfigError::MissingComponent("notifier"))?;

        let config = self.config;
        let expiry = SessionExpiry::new(navigator, Arc::clone(&notifier))
            .with_login_route(config.login_route.clone())
            .with_debounce(config.redirect_debounce());

        Ok(ApiDispatcher {
            transport,
            tokens,
            refresher,
            notifier,
            expiry,
            coordinator: RefreshCoordinator::new(),
            retry: self.retry.unwrap_or_else(|| RetryPolicy::from_settings(&config.retry)),
            base_url: config.resolved_base_url(),
            timeout: config.request_timeout(),
            upload_timeout: config.upload_timeout(),
            refresh_path: config.refresh_path,
        })
    }
}
