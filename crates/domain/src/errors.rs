//! Error types used throughout the application
//!
//! [`ApiError`] is the single error shape callers of the API client ever see.
//! Its `Display` output is the human-readable message, so UI code can show it
//! directly.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::messages;

/// Classification of an API failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No connectivity or the connection dropped before a response arrived
    Network,
    /// The server did not answer within the request timeout
    Timeout,
    /// Missing, expired or rejected credentials (401)
    Auth,
    /// Authenticated but not allowed (403)
    Permission,
    /// Rejected input (400/422)
    Validation,
    /// Server-side failure (5xx)
    Server,
    /// Application-level failure reported by an envelope with `success: false`
    Business,
    /// Anything that fits no other bucket
    Unknown,
}

impl ErrorKind {
    /// Stable label suitable for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Validation => "validation",
            Self::Server => "server",
            Self::Business => "business",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the UI layer is told about this error at interception time.
    ///
    /// Network and timeout failures only surface once retries are exhausted,
    /// validation errors are left to the calling form, and auth failures go
    /// through the session-expiry path instead.
    pub fn notifies_on_intercept(&self) -> bool {
        matches!(self, Self::Business | Self::Server | Self::Permission | Self::Unknown)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error code carried by a typed error: either the backend's string code or
/// a numeric (usually HTTP status) code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    /// Numeric code
    Number(i64),
    /// Symbolic code
    Text(String),
}

impl ErrorCode {
    /// Build a code from an arbitrary JSON value found in a response body.
    ///
    /// Numbers and strings map directly; anything else falls back to `default`.
    pub fn from_json(value: Option<&Value>, default: ErrorCode) -> Self {
        match value {
            Some(Value::Number(n)) => n.as_i64().map_or(default, Self::Number),
            Some(Value::String(s)) if !s.is_empty() => Self::Text(s.clone()),
            _ => default,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u16> for ErrorCode {
    fn from(status: u16) -> Self {
        Self::Number(i64::from(status))
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        Self::Text(code.to_string())
    }
}

/// Typed API error
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Backend or HTTP code
    pub code: ErrorCode,
    /// Display-ready message
    pub message: String,
    /// Optional structured context (server payload, underlying cause)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Creation time in epoch milliseconds
    pub timestamp: i64,
}

impl ApiError {
    /// Create an error stamped with the current time
    pub fn new(kind: ErrorKind, code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Connectivity failure with no HTTP response
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, "NETWORK_ERROR", message)
    }

    /// Request timed out
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, "TIMEOUT", messages::TIMEOUT)
    }

    /// Session could not be restored; the user has to sign in again
    pub fn session_expired() -> Self {
        Self::new(ErrorKind::Auth, 401_u16, messages::SESSION_EXPIRED)
    }

    /// Application-level failure from a `success: false` envelope
    pub fn business(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Business, code, message)
    }

    /// Response body did not match the expected schema
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, "MALFORMED_RESPONSE", messages::MALFORMED_RESPONSE)
            .with_details(Value::String(reason.into()))
    }

    /// Local failure preparing a request (serialization, bad input)
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, "INVALID_REQUEST", messages::BAD_REQUEST)
            .with_details(Value::String(reason.into()))
    }

    /// Whether this error belongs to the given kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Configuration problems detected while loading settings or wiring clients
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Invalid config format: {0}")]
    Format(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing component: {0}")]
    MissingComponent(&'static str),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}
