//! Session expiry handling: notify once, then redirect to the login route
//! after a short debounce.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use auditdesk_domain::constants::{LOGIN_REDIRECT_DEBOUNCE_MS, LOGIN_ROUTE};
use tracing::{debug, info};

use super::ports::{Navigator, Notifier};

#[derive(Clone)]
pub struct SessionExpiry {
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    login_route: String,
    debounce: Duration,
    pending: Arc<AtomicBool>,
}

impl SessionExpiry {
    pub fn new(navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            navigator,
            notifier,
            login_route: LOGIN_ROUTE.to_string(),
            debounce: Duration::from_millis(LOGIN_REDIRECT_DEBOUNCE_MS),
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub fn on_login_route(&self) -> bool {
        self.navigator.current_path() == self.login_route
    }

    /// Whether a redirect is scheduled but has not fired yet
    pub fn redirect_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Tell the user their session is gone and schedule the login redirect.
    ///
    /// Does nothing on the login route itself. Bursts of expiries while a
    /// redirect is pending collapse into the first one. Returns whether a
    /// redirect was scheduled by this call. Must be called inside a tokio
    /// runtime.
    pub fn expire(&self, message: &str) -> bool {
        if self.on_login_route() {
            debug!("session expired while on login route, not redirecting");
            return false;
        }
        if self.pending.swap(true, Ordering::SeqCst) {
            debug!("login redirect already pending");
            return false;
        }

        self.notifier.error(message);

        let navigator = Arc::clone(&self.navigator);
        let pending = Arc::clone(&self.pending);
        let route = self.login_route.clone();
        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            pending.store(false, Ordering::SeqCst);
            // The user may have navigated there on their own in the meantime.
            if navigator.current_path() != route {
                info!(route = %route, "redirecting to login");
                navigator.push(&route);
            }
        });
        true
    }
}

impl std::fmt::Debug for SessionExpiry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionExpiry")
            .field("login_route", &self.login_route)
            .field("debounce", &self.debounce)
            .field("pending", &self.redirect_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        path: Mutex<String>,
        pushes: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl Navigator for Recorder {
        fn current_path(&self) -> String {
            self.path.lock().clone()
        }

        fn push(&self, path: &str) {
            self.pushes.lock().push(path.to_string());
            *self.path.lock() = path.to_string();
        }
    }

    impl Notifier for Recorder {
        fn error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }

        fn success(&self, _message: &str) {}
    }

    fn expiry_at(path: &str) -> (Arc<Recorder>, SessionExpiry) {
        let recorder = Arc::new(Recorder::default());
        *recorder.path.lock() = path.to_string();
        let expiry = SessionExpiry::new(recorder.clone(), recorder.clone());
        (recorder, expiry)
    }

    #[tokio::test(start_paused = true)]
    async fn redirects_after_debounce() {
        let (recorder, expiry) = expiry_at("/products");

        assert!(expiry.expire("登录已过期，请重新登录"));
        assert_eq!(recorder.errors.lock().len(), 1);
        assert!(recorder.pushes.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(recorder.pushes.lock().as_slice(), ["/login".to_string()]);
        assert!(!expiry.redirect_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn noop_on_login_route() {
        let (recorder, expiry) = expiry_at("/login");

        assert!(!expiry.expire("登录已过期，请重新登录"));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(recorder.errors.lock().is_empty());
        assert!(recorder.pushes.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_one_redirect() {
        let (recorder, expiry) = expiry_at("/audits");

        assert!(expiry.expire("a"));
        assert!(!expiry.expire("b"));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(recorder.errors.lock().len(), 1);
        assert_eq!(recorder.pushes.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn skips_push_if_user_already_navigated() {
        let (recorder, expiry) = expiry_at("/rules");

        expiry.expire("x");
        *recorder.path.lock() = "/login".to_string();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(recorder.pushes.lock().is_empty());
    }
}
