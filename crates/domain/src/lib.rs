//! # AuditDesk Domain
//!
//! Domain types shared by every AuditDesk crate.
//!
//! This crate contains:
//! - The response envelope and its boundary decoder
//! - The typed API error and its classification kinds
//! - Client configuration structures
//! - Endpoint paths, defaults and user-facing messages
//! - Request/response models for the REST resources
//!
//! ## Architecture
//! - No dependencies on other AuditDesk crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod envelope;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use envelope::{ApiResponse, BusinessFailure, Envelope};
pub use errors::*;
pub use types::*;
