//! In-process navigator for hosts without a router (CLI tools, tests).

use auditdesk_core::session::Navigator;
use parking_lot::RwLock;
use tracing::debug;

#[derive(Debug)]
pub struct MemoryNavigator {
    history: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self { history: RwLock::new(vec![initial.into()]) }
    }

    /// Every path visited, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.read().clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.history.read().last().cloned().unwrap_or_default()
    }

    fn push(&self, path: &str) {
        debug!(path, "navigate");
        self.history.write().push(path.to_string());
    }
}
