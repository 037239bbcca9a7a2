//! # AuditDesk Core
//!
//! The API client pipeline, free of any concrete HTTP library.
//!
//! This crate contains:
//! - The request dispatcher (auth header, refresh-on-401, retry with backoff)
//! - The token refresh coordinator
//! - Error classification into the typed taxonomy
//! - Session collaborator ports (token store, refresher, navigation, toasts)
//! - The per-operation loading tracker
//!
//! ## Architecture Principles
//! - Only depends on `auditdesk-domain`
//! - No reqwest, filesystem or UI code
//! - All external dependencies via traits

pub mod http;
pub mod loading;
pub mod session;

pub use http::{
    ApiDispatcher, ApiRequest, HttpMethod, HttpTransport, RefreshCoordinator, RetryPolicy,
    TransportError, TransportRequest, TransportResponse,
};
pub use loading::{LoadingGuard, LoadingTracker};
pub use session::{Navigator, Notifier, SessionExpiry, SessionRefresher, TokenStore};
