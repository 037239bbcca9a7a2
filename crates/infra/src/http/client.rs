//! reqwest-backed implementation of the [`HttpTransport`] port.
//!
//! This client sends exactly one request per call. Retries, refresh and
//! error classification happen in the core dispatcher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auditdesk_core::http::{
    FilePart, HttpMethod, HttpTransport, MultipartForm, ProgressCallback, RequestBody,
    TransportError, TransportRequest, TransportResponse, UploadProgress,
};
use auditdesk_domain::ConfigError;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client as ReqwestClient, Method};
use tracing::debug;

use crate::errors::conversions::client_setup_error;
use crate::errors::InfraError;

/// Upload chunk size used when reporting progress
const PROGRESS_CHUNK_SIZE: usize = 64 * 1024;

/// HTTP client speaking to the AuditDesk backend.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Client`] if the TLS backend cannot be set up.
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    /// Wrap an already configured reqwest client.
    pub fn from_reqwest(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = to_reqwest_method(request.method);
        let url = request.url;

        let mut builder = self.client.request(method.clone(), &url).timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(build_form(form, request.progress)?),
        };

        debug!(%method, %url, timeout_ms = request.timeout.as_millis() as u64, "sending HTTP request");

        let response = builder.send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            TransportError::from(InfraError::from(err))
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|err| TransportError::from(InfraError::from(err)))?;

        debug!(%method, %url, %status, bytes = body.len(), "received HTTP response");

        Ok(TransportResponse { status: status.as_u16(), content_type, body: body.to_vec() })
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
    accept_invalid_certs: bool,
}

impl HttpClientBuilder {
    /// Timeout for establishing the TCP/TLS connection. Whole-request
    /// timeouts are set per request.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Test-only helper to allow insecure TLS (e.g., self-signed certs).
    #[cfg(test)]
    #[must_use]
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// # Errors
    /// Returns [`ConfigError::Client`] if reqwest rejects the configuration.
    pub fn build(self) -> Result<HttpClient, ConfigError> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|err| client_setup_error(&err))?;
        Ok(HttpClient { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn build_form(
    form: MultipartForm,
    progress: Option<ProgressCallback>,
) -> Result<Form, TransportError> {
    let total = form.content_length();
    let sent = Arc::new(AtomicU64::new(0));

    let mut out = Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }
    for file in form.files {
        let FilePart { field_name, file_name, mime_type, content } = file;
        let part = match &progress {
            Some(callback) => {
                let length = content.len() as u64;
                let body = progress_body(&content, callback.clone(), Arc::clone(&sent), total);
                Part::stream_with_length(body, length)
            }
            None => Part::bytes(content.as_ref().clone()),
        }
        .file_name(file_name);

        let part = match mime_type {
            Some(mime) => part
                .mime_str(&mime)
                .map_err(|err| TransportError::Other(format!("invalid mime type `{mime}`: {err}")))?,
            None => part,
        };
        out = out.part(field_name, part);
    }
    Ok(out)
}

/// Stream file content in chunks, reporting cumulative progress across the
/// whole form as each chunk is handed to the connection.
fn progress_body(
    content: &[u8],
    callback: ProgressCallback,
    sent: Arc<AtomicU64>,
    total: u64,
) -> Body {
    let chunks: Vec<Vec<u8>> = content.chunks(PROGRESS_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        let len = chunk.len() as u64;
        let loaded = sent.fetch_add(len, Ordering::SeqCst) + len;
        callback.report(UploadProgress { loaded, total });
        Ok::<_, std::io::Error>(chunk)
    }));
    Body::wrap_stream(stream)
}
