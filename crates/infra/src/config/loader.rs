//! Configuration loader
//!
//! Builds a [`ClientConfig`] from an optional file plus environment
//! overrides.
//!
//! ## Loading Strategy
//! 1. Load `.env` from the working directory, if present
//! 2. Read the first config file found by [`probe_config_paths`], or start
//!    from defaults
//! 3. Apply `AUDITDESK_*` environment overrides on top
//! 4. Validate the explicit base URL, if any
//!
//! ## Environment Variables
//! - `AUDITDESK_MODE`: `development`, `production` or `test`
//! - `AUDITDESK_API_BASE_URL`: API base URL (ignored in development)
//! - `AUDITDESK_REQUEST_TIMEOUT_MS`: Default request timeout
//! - `AUDITDESK_UPLOAD_TIMEOUT_MS`: Upload and parse timeout
//! - `AUDITDESK_MAX_RETRIES`: Retries after the first attempt
//! - `AUDITDESK_RETRY_BASE_DELAY_MS`: First backoff delay
//! - `AUDITDESK_RETRY_SERVER_ERRORS`: Retry 5xx responses (true/false)
//! - `AUDITDESK_REFRESH_PATH`: Token refresh endpoint path
//! - `AUDITDESK_LOGIN_ROUTE`: Route the session-expired redirect targets
//! - `AUDITDESK_REDIRECT_DEBOUNCE_MS`: Delay before that redirect
//! - `AUDITDESK_USER_AGENT`: User-Agent header
//!
//! ## File Locations
//! The loader probes, in order:
//! 1. `./auditdesk.{json,toml}` and `./config.{json,toml}`
//! 2. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use auditdesk_domain::{ClientConfig, ConfigError, RunMode};

const FILE_STEMS: [&str; 2] = ["auditdesk", "config"];
const FILE_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration: `.env`, optional file, then environment overrides.
///
/// A missing config file is not an error; defaults are used instead.
///
/// # Errors
/// Returns [`ConfigError`] if a config file exists but cannot be read or
/// parsed, or if an override has an invalid value.
pub fn load() -> Result<ClientConfig, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            ClientConfig::default()
        }
    };

    let config = apply_env_overrides(base)?;
    validate(&config)?;
    tracing::info!(mode = ?config.mode, base_url = %config.resolved_base_url(), "Configuration loaded");
    Ok(config)
}

/// Defaults plus environment overrides, no file lookup
///
/// # Errors
/// Returns [`ConfigError::InvalidValue`] for unparsable overrides or an
/// invalid base URL.
pub fn load_from_env() -> Result<ClientConfig, ConfigError> {
    let config = apply_env_overrides(ClientConfig::default())?;
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// extension; missing fields take their defaults.
///
/// # Errors
/// Returns [`ConfigError::NotFound`] when no file exists,
/// [`ConfigError::Io`] when it cannot be read and [`ConfigError::Format`]
/// when it cannot be parsed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    let config_path = match path {
        Some(p) if p.exists() => p,
        Some(p) => return Err(ConfigError::NotFound(p.display().to_string())),
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::NotFound("no config file in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents =
        std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io(e.to_string()))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::Format(format!("invalid TOML: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::Format(format!("invalid JSON: {e}"))),
        other => Err(ConfigError::Format(format!("unsupported config format: {other}"))),
    }
}

/// First existing config file among the standard locations
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| {
            FILE_STEMS.iter().flat_map(move |stem| {
                FILE_EXTENSIONS.iter().map(move |ext| dir.join(format!("{stem}.{ext}")))
            })
        })
        .find(|path| path.exists())
}

/// Apply `AUDITDESK_*` variables on top of `config`
///
/// # Errors
/// Returns [`ConfigError::InvalidValue`] naming the first variable that
/// does not parse.
pub fn apply_env_overrides(mut config: ClientConfig) -> Result<ClientConfig, ConfigError> {
    if let Some(mode) = env_parse::<RunMode>("AUDITDESK_MODE")? {
        config.mode = mode;
    }
    if let Some(url) = env_string("AUDITDESK_API_BASE_URL") {
        config.base_url = Some(url);
    }
    if let Some(ms) = env_parse("AUDITDESK_REQUEST_TIMEOUT_MS")? {
        config.request_timeout_ms = ms;
    }
    if let Some(ms) = env_parse("AUDITDESK_UPLOAD_TIMEOUT_MS")? {
        config.upload_timeout_ms = ms;
    }
    if let Some(retries) = env_parse("AUDITDESK_MAX_RETRIES")? {
        config.retry.max_retries = retries;
    }
    if let Some(ms) = env_parse("AUDITDESK_RETRY_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = ms;
    }
    config.retry.retry_server_errors =
        env_bool("AUDITDESK_RETRY_SERVER_ERRORS", config.retry.retry_server_errors);
    if let Some(path) = env_string("AUDITDESK_REFRESH_PATH") {
        config.refresh_path = path;
    }
    if let Some(route) = env_string("AUDITDESK_LOGIN_ROUTE") {
        config.login_route = route;
    }
    if let Some(ms) = env_parse("AUDITDESK_REDIRECT_DEBOUNCE_MS")? {
        config.redirect_debounce_ms = ms;
    }
    if let Some(agent) = env_string("AUDITDESK_USER_AGENT") {
        config.user_agent = Some(agent);
    }
    Ok(config)
}

/// Reject an explicit base URL that is not an absolute http(s) URL.
/// Blank values are allowed and fall back to the default. Development mode
/// ignores the configured URL, so it is not checked there.
fn validate(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.mode == RunMode::Development {
        return Ok(());
    }
    let Some(raw) = config.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(());
    };

    let invalid = |message: String| ConfigError::InvalidValue { key: "base_url".into(), message };
    let parsed = url::Url::parse(raw).map_err(|e| invalid(format!("`{raw}`: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(format!("unsupported scheme `{scheme}`"))),
    }
}

/// Non-empty environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("`{raw}`: {e}"),
            })
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
