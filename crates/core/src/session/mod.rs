//! Session collaborators and expiry handling

pub mod expiry;
pub mod ports;

pub use expiry::SessionExpiry;
pub use ports::{Navigator, Notifier, SessionRefresher, TokenStore};
