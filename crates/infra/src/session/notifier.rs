//! Notifier that routes user-facing messages into the log.

use auditdesk_core::session::Notifier;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        warn!(target: "auditdesk::notify", message, "error notification");
    }

    fn success(&self, message: &str) {
        info!(target: "auditdesk::notify", message, "success notification");
    }
}
