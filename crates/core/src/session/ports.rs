//! Session collaborator ports
//!
//! Implemented by infrastructure (persistent token storage, the refresh
//! endpoint) and by the hosting UI (navigation, toast notifications).

use async_trait::async_trait;
use auditdesk_domain::{ApiError, UserInfo};

/// Holder of the current credentials and cached identity.
///
/// Reads and writes are synchronous and cheap; implementations are expected
/// to keep an in-memory copy even when they persist.
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    fn set_token(&self, token: &str);

    fn set_refresh_token(&self, refresh_token: &str);

    fn user(&self) -> Option<UserInfo>;

    fn set_user(&self, user: &UserInfo);

    fn permissions(&self) -> Vec<String>;

    fn set_permissions(&self, permissions: &[String]);

    /// Forget every credential and cached identity
    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }
}

/// Performs the actual token refresh
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Exchange the stored refresh token for a new access token and write it
    /// to the token store.
    ///
    /// Returns `Ok(false)` when no refresh was possible (e.g. no refresh
    /// token stored).
    async fn refresh_token_action(&self) -> Result<bool, ApiError>;
}

/// Client-side routing
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    fn push(&self, path: &str);
}

/// User-facing notifications
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);

    fn success(&self, message: &str);
}
