//! Response envelope decoding
//!
//! Every JSON response body from the backend is wrapped as
//! `{ code, message, data, success, timestamp }`. Bodies are decoded once, at
//! the client boundary, into [`Envelope`]; anything that does not carry a
//! boolean `success` field is rejected instead of being passed through.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::messages;
use crate::errors::{ApiError, ErrorCode};

fn default_code() -> i64 {
    200
}

/// Successful response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_code")]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Payload; absent for commands that return nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl<T> ApiResponse<T> {
    /// Build a successful envelope locally (used by fail-open fallbacks)
    pub fn ok(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            code: 200,
            message: message.into(),
            data,
            success: true,
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
        }
    }

    /// Transform the payload, keeping the envelope metadata
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResponse<U> {
        ApiResponse {
            code: self.code,
            message: self.message,
            data: self.data.map(f),
            success: self.success,
            timestamp: self.timestamp,
        }
    }

    /// Drop the payload
    pub fn without_data(self) -> ApiResponse<()> {
        ApiResponse {
            code: self.code,
            message: self.message,
            data: None,
            success: self.success,
            timestamp: self.timestamp,
        }
    }
}

/// Application-level failure reported with `success: false`
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl BusinessFailure {
    /// Convert into the typed error surfaced to callers
    pub fn into_error(self) -> ApiError {
        ApiError::business(self.code, self.message)
    }
}

/// A decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(ApiResponse<T>),
    Failure(BusinessFailure),
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode raw response bytes.
    ///
    /// # Errors
    /// Returns an `Unknown` [`ApiError`] when the body is not JSON, not an
    /// object, has no boolean `success` field, or the payload does not match
    /// `T`.
    pub fn decode(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::malformed(format!("body is not JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON value.
    ///
    /// # Errors
    /// See [`Envelope::decode`].
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let success = match value.get("success") {
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(ApiError::malformed("`success` is not a boolean")),
            None => return Err(ApiError::malformed("missing `success` field")),
        };

        if !success {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(messages::OPERATION_FAILED)
                .to_string();
            let code = ErrorCode::from_json(value.get("code"), ErrorCode::from("BUSINESS_ERROR"));
            return Ok(Self::Failure(BusinessFailure { code, message }));
        }

        serde_json::from_value::<ApiResponse<T>>(value)
            .map(Self::Success)
            .map_err(|e| ApiError::malformed(format!("payload does not match schema: {e}")))
    }

    /// Collapse into a `Result`, turning failures into business errors
    ///
    /// # Errors
    /// Returns the business error for `success: false` envelopes.
    pub fn into_result(self) -> Result<ApiResponse<T>, ApiError> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Failure(failure) => Err(failure.into_error()),
        }
    }
}

/// Check whether a JSON body is a `success: false` envelope without decoding
/// the payload. Used for binary endpoints that answer errors as JSON.
pub fn business_failure(body: &[u8]) -> Option<BusinessFailure> {
    match Envelope::<Value>::decode(body) {
        Ok(Envelope::Failure(failure)) => Some(failure),
        _ => None,
    }
}
