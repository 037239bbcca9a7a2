//! # AuditDesk Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest HTTP transport
//! - Token persistence, the refresh endpoint adapter, navigation and
//!   notification adapters
//! - The typed REST API facade ([`ApiClient`])
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `auditdesk-core`
//! - Depends on `auditdesk-domain` and `auditdesk-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod session;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientBuilder, AuditsApi, AuthApi, DocumentUpload, DocumentsApi, ProductsApi,
    RulesApi,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat};
pub use session::{
    EndpointRefresher, FileTokenStore, MemoryNavigator, MemoryTokenStore, StoredSession,
    TracingNotifier,
};
