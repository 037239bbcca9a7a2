//! Conversions from external infrastructure errors into core error types.

use auditdesk_core::http::TransportError;
use auditdesk_domain::ConfigError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the core transport error.
#[derive(Debug)]
pub struct InfraError(pub TransportError);

impl From<InfraError> for TransportError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            return Self(TransportError::Timeout(err.to_string()));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return Self(TransportError::Connect(err.to_string()));
        }

        if err.is_request() || err.is_body() {
            return Self(TransportError::Connect(err.to_string()));
        }

        Self(TransportError::Other(err.to_string()))
    }
}

/// Map a client construction failure into a configuration error
pub fn client_setup_error(err: &HttpError) -> ConfigError {
    ConfigError::Client(err.to_string())
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
