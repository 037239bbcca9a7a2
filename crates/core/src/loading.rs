//! Per-operation loading flags
//!
//! UI code asks "is the login request running?" by key. Each key counts the
//! calls in flight, so overlapping calls on one key keep it loading until the
//! last one finishes. Keys are created on first use and live as long as the
//! tracker.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

static GLOBAL: Lazy<Arc<LoadingTracker>> = Lazy::new(|| Arc::new(LoadingTracker::new()));

#[derive(Debug, Default)]
pub struct LoadingTracker {
    in_flight: RwLock<HashMap<String, usize>>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide default tracker
    pub fn global() -> Arc<LoadingTracker> {
        Arc::clone(&GLOBAL)
    }

    /// Force a key on or off.
    ///
    /// `true` marks it loading even with nothing in flight; `false` resets
    /// its in-flight count.
    pub fn set_loading(&self, key: &str, loading: bool) {
        let mut in_flight = self.in_flight.write();
        let count = in_flight.entry(key.to_string()).or_default();
        *count = if loading { (*count).max(1) } else { 0 };
    }

    /// `false` for keys never seen
    pub fn is_loading(&self, key: &str) -> bool {
        self.in_flight.read().get(key).is_some_and(|count| *count > 0)
    }

    /// Number of tracked calls currently running under `key`
    pub fn in_flight(&self, key: &str) -> usize {
        self.in_flight.read().get(key).copied().unwrap_or(0)
    }

    pub fn any_loading(&self) -> bool {
        self.in_flight.read().values().any(|count| *count > 0)
    }

    pub fn snapshot(&self) -> HashMap<String, bool> {
        self.in_flight.read().iter().map(|(key, count)| (key.clone(), *count > 0)).collect()
    }

    /// Count one call in flight under `key` until the returned guard is
    /// dropped
    pub fn guard(&self, key: &str) -> LoadingGuard<'_> {
        *self.in_flight.write().entry(key.to_string()).or_default() += 1;
        LoadingGuard { tracker: self, key: key.to_string() }
    }

    fn release(&self, key: &str) {
        if let Some(count) = self.in_flight.write().get_mut(key) {
            *count = count.saturating_sub(1);
        }
    }

    /// Run `op` with `key` marked as loading.
    ///
    /// The call is released however the future ends: success, error, panic
    /// or being dropped mid-flight.
    pub async fn track<F, Fut, T>(&self, key: &str, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.guard(key);
        op().await
    }
}

/// Releases its in-flight call on drop
#[derive(Debug)]
pub struct LoadingGuard<'a> {
    tracker: &'a LoadingTracker,
    key: String,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.release(&self.key);
    }
}
