//! Retry-with-backoff policy
//!
//! Only failures without an HTTP response and (optionally) 5xx responses are
//! retried. The per-call counter lives in a [`RetryContext`] owned by the
//! dispatch loop, never on the request itself.

use std::time::Duration;

use auditdesk_domain::RetrySettings;
use tokio::time::Instant;

/// Backoff policy: `base * 2^(attempt - 1)` for attempts `1..=max_retries`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    retry_server_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay, retry_server_errors: true }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            retry_server_errors: settings.retry_server_errors,
        }
    }

    /// Never retry
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    #[must_use]
    pub fn retry_server_errors(mut self, enabled: bool) -> Self {
        self.retry_server_errors = enabled;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether a response with this status may be retried
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_server_errors && (500..600).contains(&status)
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Retry bookkeeping for one logical request
#[derive(Debug, Clone)]
pub struct RetryContext {
    attempt: u32,
    max_attempts: u32,
    started_at: Instant,
}

impl RetryContext {
    pub fn new(max_attempts: u32) -> Self {
        Self { attempt: 0, max_attempts, started_at: Instant::now() }
    }

    /// Retries performed so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Reserve the next retry and return its delay, or `None` once the
    /// budget is spent.
    pub fn next_delay(&mut self, policy: &RetryPolicy) -> Option<Duration> {
        if self.exhausted() {
            return None;
        }
        self.attempt += 1;
        Some(policy.backoff(self.attempt))
    }
}
