//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    endpoints, DEFAULT_API_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_RETRY_BASE_DELAY_MS, DEV_PROXY_BASE_URL, LOGIN_REDIRECT_DEBOUNCE_MS, LOGIN_ROUTE,
    UPLOAD_REQUEST_TIMEOUT_MS,
};

/// Runtime mode, mirrors the build mode of the hosting application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Development,
    #[default]
    Production,
    Test,
}

impl std::str::FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown run mode `{other}`")),
        }
    }
}

/// Resolve the API base URL.
///
/// Development always talks to the local proxy. Other modes use the
/// configured URL, falling back to the same default when it is unset or
/// blank.
pub fn resolve_base_url(mode: RunMode, configured: Option<&str>) -> String {
    if mode == RunMode::Development {
        return DEV_PROXY_BASE_URL.to_string();
    }

    configured
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_API_BASE_URL)
        .to_string()
}

/// Retry settings for network-level failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// First backoff delay; doubles on every further retry
    pub base_delay_ms: u64,
    /// Whether 5xx responses are retried as well
    pub retry_server_errors: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            retry_server_errors: true,
        }
    }
}

/// API client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub mode: RunMode,
    /// Explicit base URL; resolved through [`resolve_base_url`]
    pub base_url: Option<String>,
    pub request_timeout_ms: u64,
    /// Timeout for document upload and parsing endpoints
    pub upload_timeout_ms: u64,
    pub retry: RetrySettings,
    pub refresh_path: String,
    pub login_route: String,
    pub redirect_debounce_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            base_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            upload_timeout_ms: UPLOAD_REQUEST_TIMEOUT_MS,
            retry: RetrySettings::default(),
            refresh_path: endpoints::AUTH_REFRESH.to_string(),
            login_route: LOGIN_ROUTE.to_string(),
            redirect_debounce_ms: LOGIN_REDIRECT_DEBOUNCE_MS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Config pointing at an explicit base URL, everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: Some(base_url.into()), ..Self::default() }
    }

    /// Effective base URL after applying the mode rule
    pub fn resolved_base_url(&self) -> String {
        resolve_base_url(self.mode, self.base_url.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    pub fn redirect_debounce(&self) -> Duration {
        Duration::from_millis(self.redirect_debounce_ms)
    }
}
