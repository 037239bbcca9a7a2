//! Port interfaces for the wire transport
//!
//! The dispatcher never touches an HTTP library directly. Infrastructure
//! provides an [`HttpTransport`]; tests provide scripted ones.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::request::{HttpMethod, ProgressCallback, RequestBody};

/// A fully prepared request, ready to put on the wire
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Duration,
    pub progress: Option<ProgressCallback>,
}

impl TransportRequest {
    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, content_type: None, body: body.into() }
    }

    /// JSON response with the matching content type
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| ct.contains("json"))
    }
}

/// Failure before any HTTP response was received
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Sends prepared requests over the wire
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return whatever the server answered.
    ///
    /// Non-2xx statuses are *not* errors at this level; only failures that
    /// produced no response are.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
