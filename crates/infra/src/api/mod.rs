//! Typed REST API for the AuditDesk backend
//!
//! Every call goes through the core dispatcher, so token refresh, retries and
//! error classification behave the same across resources. Calls that drive
//! a spinner in the UI are wrapped in the loading tracker.

pub mod audits;
pub mod auth;
pub mod client;
pub mod documents;
pub mod products;
pub mod rules;

pub use audits::AuditsApi;
pub use auth::AuthApi;
pub use client::{ApiClient, ApiClientBuilder};
pub use documents::{DocumentUpload, DocumentsApi};
pub use products::ProductsApi;
pub use rules::RulesApi;
