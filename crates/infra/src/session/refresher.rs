//! Default [`SessionRefresher`]: exchanges the stored refresh token at the
//! refresh endpoint.
//!
//! Talks to the transport directly instead of going through the dispatcher,
//! so a 401 from the refresh endpoint can never trigger another refresh.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auditdesk_core::http::classify::{status_error, transport_error};
use auditdesk_core::http::{
    join_url, HttpMethod, HttpTransport, RequestBody, TransportRequest,
};
use auditdesk_core::session::{SessionRefresher, TokenStore};
use auditdesk_domain::constants::HEADER_REQUEST_ID;
use auditdesk_domain::{ApiError, ClientConfig, Envelope, RefreshData, RefreshRequest};
use tracing::{debug, info, instrument, warn};

pub struct EndpointRefresher {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    url: String,
    timeout: Duration,
}

impl EndpointRefresher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            transport,
            tokens,
            url: join_url(&config.resolved_base_url(), &config.refresh_path),
            timeout: config.request_timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SessionRefresher for EndpointRefresher {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn refresh_token_action(&self) -> Result<bool, ApiError> {
        let Some(refresh_token) = self.tokens.refresh_token().filter(|t| !t.is_empty()) else {
            debug!("no refresh token stored");
            return Ok(false);
        };

        let body = serde_json::to_value(RefreshRequest { refresh_token })
            .map_err(|e| ApiError::invalid_request(e.to_string()))?;
        let request = TransportRequest {
            method: HttpMethod::Post,
            url: self.url.clone(),
            query: Vec::new(),
            headers: vec![(HEADER_REQUEST_ID.to_string(), uuid_v4())],
            body: RequestBody::Json(body),
            timeout: self.timeout,
            progress: None,
        };

        let response = self.transport.send(request).await.map_err(|e| transport_error(&e))?;
        if !response.is_success() {
            warn!(status = response.status, "refresh endpoint rejected the refresh token");
            return Err(status_error(response.status, &response.body));
        }

        let data = Envelope::<RefreshData>::decode(&response.body)?.into_result()?.data;
        let Some(data) = data.filter(|d| !d.token.is_empty()) else {
            warn!("refresh response carried no token");
            return Ok(false);
        };

        self.tokens.set_token(&data.token);
        if let Some(rotated) = data.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            self.tokens.set_refresh_token(rotated);
        }
        info!(rotated = data.refresh_token.is_some(), "session token refreshed");
        Ok(true)
    }
}

impl std::fmt::Debug for EndpointRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointRefresher").field("url", &self.url).finish_non_exhaustive()
    }
}

fn uuid_v4() -> String {
    uuid::Uuid::new_v4().to_string()
}
