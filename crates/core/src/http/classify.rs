//! Error classification
//!
//! Maps HTTP statuses and transport failures onto the typed error taxonomy.

use auditdesk_domain::constants::messages;
use auditdesk_domain::{ApiError, ErrorCode, ErrorKind};
use serde_json::Value;

use super::ports::TransportError;

/// Kind and fallback message for an error status
pub fn status_kind(status: u16) -> (ErrorKind, &'static str) {
    match status {
        400 => (ErrorKind::Validation, messages::BAD_REQUEST),
        422 => (ErrorKind::Validation, messages::VALIDATION_FAILED),
        401 => (ErrorKind::Auth, messages::UNAUTHORIZED),
        403 => (ErrorKind::Permission, messages::FORBIDDEN),
        404 => (ErrorKind::Business, messages::NOT_FOUND),
        500 => (ErrorKind::Server, messages::SERVER_ERROR),
        502..=504 => (ErrorKind::Server, messages::SERVICE_UNAVAILABLE),
        _ => (ErrorKind::Business, messages::REQUEST_FAILED),
    }
}

/// Build the typed error for a non-2xx response.
///
/// A `message` in the JSON body wins over the generic message so backend
/// explanations ("用户名或密码不正确") reach the user unchanged. The body's
/// `code` is kept in `details`; the error code itself is the HTTP status.
pub fn status_error(status: u16, body: &[u8]) -> ApiError {
    let (kind, fallback) = status_kind(status);
    let parsed: Option<Value> = serde_json::from_slice(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_string();

    let error = ApiError::new(kind, ErrorCode::from(status), message);
    match parsed {
        Some(body) => error.with_details(body),
        None => error,
    }
}

/// Build the typed error for a failure that produced no response
pub fn transport_error(error: &TransportError) -> ApiError {
    if error.is_timeout() {
        ApiError::timeout().with_details(Value::String(error.to_string()))
    } else {
        ApiError::network(messages::NETWORK_FAILED).with_details(Value::String(error.to_string()))
    }
}
