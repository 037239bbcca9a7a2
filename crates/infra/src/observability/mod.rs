//! Logging setup
//!
//! Installs a global `tracing` subscriber for binaries and integration
//! harnesses embedding the client. Library code only emits events; it never
//! installs a subscriber on its own.
//!
//! The filter comes from `RUST_LOG` and defaults to `info`. Requests are
//! logged under the `auditdesk_core::http` and `auditdesk_infra::http`
//! targets, user-facing notifications under `auditdesk::notify`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format of the global subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, one line per event
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("A global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// # Errors
/// Returns [`ObservabilityError::AlreadyInstalled`] if another subscriber
/// was set first.
pub fn init_tracing(format: LogFormat) -> Result<(), ObservabilityError> {
    let registry = tracing_subscriber::registry().with(build_env_filter());
    let result = match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => {
            registry.with(fmt::layer().json().with_current_span(true)).try_init()
        }
    };
    result.map_err(|e| ObservabilityError::AlreadyInstalled(e.to_string()))
}

/// Install the subscriber with the format named by `AUDITDESK_LOG_FORMAT`,
/// ignoring the error when one is already installed.
pub fn init_from_env() {
    let format = std::env::var("AUDITDESK_LOG_FORMAT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default();
    if let Err(err) = init_tracing(format) {
        tracing::debug!(error = %err, "tracing already initialised");
    }
}
