//! Token refresh coordination
//!
//! Guarantees that at most one token refresh is in flight. The first request
//! to hit a 401 becomes the leader and receives a [`RefreshLease`]; every
//! request arriving while the refresh runs is queued and woken, in arrival
//! order, with the leader's outcome.
//!
//! ```text
//! Idle ──acquire──▶ Refreshing ──complete/drop──▶ Draining ──▶ Idle
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use auditdesk_domain::ApiError;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// New access token, or the failure every queued request is rejected with
pub type RefreshOutcome = Result<String, ApiError>;

/// Coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
    Draining,
}

#[derive(Debug)]
struct Inner {
    state: RefreshState,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
    last_outcome: Option<RefreshOutcome>,
    cycles: u64,
}

impl Default for Inner {
    fn default() -> Self {
        Self { state: RefreshState::Idle, waiters: VecDeque::new(), last_outcome: None, cycles: 0 }
    }
}

/// Single owner of the refresh flag and waiter queue
#[derive(Debug, Clone, Default)]
pub struct RefreshCoordinator {
    inner: Arc<Mutex<Inner>>,
}

/// Result of [`RefreshCoordinator::acquire_or_enqueue`]
#[derive(Debug)]
pub enum RefreshTicket {
    /// Caller must run the refresh and complete the lease
    Leader(RefreshLease),
    /// Caller waits for the leader's outcome
    Waiter(RefreshWaiter),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Become the refresh leader, or join the queue behind the running one.
    ///
    /// The state check and transition happen in one critical section, so two
    /// concurrent callers can never both become leader.
    pub fn acquire_or_enqueue(&self) -> RefreshTicket {
        let mut inner = self.inner.lock();
        match inner.state {
            RefreshState::Idle => {
                inner.state = RefreshState::Refreshing;
                inner.cycles += 1;
                debug!(cycle = inner.cycles, "token refresh started");
                RefreshTicket::Leader(RefreshLease {
                    inner: Arc::clone(&self.inner),
                    completed: false,
                })
            }
            RefreshState::Refreshing => {
                let (tx, rx) = oneshot::channel();
                inner.waiters.push_back(tx);
                debug!(queued = inner.waiters.len(), "request queued behind token refresh");
                RefreshTicket::Waiter(RefreshWaiter { rx })
            }
            RefreshState::Draining => {
                // The outcome is already known; hand it over immediately.
                let (tx, rx) = oneshot::channel();
                let outcome =
                    inner.last_outcome.clone().unwrap_or_else(|| Err(ApiError::session_expired()));
                let _ = tx.send(outcome);
                RefreshTicket::Waiter(RefreshWaiter { rx })
            }
        }
    }

    pub fn state(&self) -> RefreshState {
        self.inner.lock().state
    }

    pub fn is_refreshing(&self) -> bool {
        self.state() == RefreshState::Refreshing
    }

    /// Requests currently waiting on the running refresh
    pub fn queued(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    /// Refresh cycles started since creation
    pub fn cycles(&self) -> u64 {
        self.inner.lock().cycles
    }
}

/// Receiving end of a queued request
#[derive(Debug)]
pub struct RefreshWaiter {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl RefreshWaiter {
    /// Wait for the leader's outcome
    pub async fn wait(self) -> RefreshOutcome {
        self.rx.await.unwrap_or_else(|_| Err(ApiError::session_expired()))
    }
}

/// Proof of refresh leadership.
///
/// Completing it wakes the queue. Dropping it without completing (panic,
/// cancelled future) rejects the queue with a session-expired error and
/// still returns the coordinator to `Idle`.
#[derive(Debug)]
pub struct RefreshLease {
    inner: Arc<Mutex<Inner>>,
    completed: bool,
}

impl RefreshLease {
    /// Publish the refresh outcome and release leadership.
    ///
    /// Returns how many queued requests were woken.
    pub fn complete(mut self, outcome: RefreshOutcome) -> usize {
        self.completed = true;
        drain(&self.inner, outcome)
    }
}

impl Drop for RefreshLease {
    fn drop(&mut self) {
        if !self.completed {
            warn!("token refresh abandoned before completion, rejecting queued requests");
            drain(&self.inner, Err(ApiError::session_expired()));
        }
    }
}

fn drain(inner: &Mutex<Inner>, outcome: RefreshOutcome) -> usize {
    let waiters = {
        let mut guard = inner.lock();
        guard.state = RefreshState::Draining;
        guard.last_outcome = Some(outcome.clone());
        std::mem::take(&mut guard.waiters)
    };

    let woken = waiters.len();
    for waiter in waiters {
        // A waiter whose request was dropped has gone away; nothing to do.
        let _ = waiter.send(outcome.clone());
    }

    let mut guard = inner.lock();
    guard.state = RefreshState::Idle;
    guard.last_outcome = None;
    debug!(woken, success = outcome.is_ok(), "token refresh queue drained");
    woken
}

#[cfg(test)]
mod tests {
    use auditdesk_domain::ErrorKind;

    use super::*;

    fn leader(coordinator: &RefreshCoordinator) -> RefreshLease {
        match coordinator.acquire_or_enqueue() {
            RefreshTicket::Leader(lease) => lease,
            RefreshTicket::Waiter(_) => panic!("expected leadership"),
        }
    }

    fn waiter(coordinator: &RefreshCoordinator) -> RefreshWaiter {
        match coordinator.acquire_or_enqueue() {
            RefreshTicket::Waiter(waiter) => waiter,
            RefreshTicket::Leader(_) => panic!("expected to queue"),
        }
    }

    #[tokio::test]
    async fn second_caller_queues_behind_leader() {
        let coordinator = RefreshCoordinator::new();
        let lease = leader(&coordinator);
        assert_eq!(coordinator.state(), RefreshState::Refreshing);

        let first = waiter(&coordinator);
        let second = waiter(&coordinator);
        assert_eq!(coordinator.queued(), 2);

        assert_eq!(lease.complete(Ok("new-token".into())), 2);
        assert_eq!(first.wait().await.unwrap(), "new-token");
        assert_eq!(second.wait().await.unwrap(), "new-token");
        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(coordinator.cycles(), 1);
    }

    #[tokio::test]
    async fn failure_rejects_every_waiter() {
        let coordinator = RefreshCoordinator::new();
        let lease = leader(&coordinator);
        let queued = waiter(&coordinator);

        lease.complete(Err(ApiError::session_expired()));

        let err = queued.wait().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
        assert_eq!(coordinator.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn dropped_lease_still_releases() {
        let coordinator = RefreshCoordinator::new();
        let lease = leader(&coordinator);
        let queued = waiter(&coordinator);

        drop(lease);

        assert!(queued.wait().await.is_err());
        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(coordinator.queued(), 0);
    }

    #[tokio::test]
    async fn next_cycle_starts_fresh() {
        let coordinator = RefreshCoordinator::new();
        leader(&coordinator).complete(Err(ApiError::session_expired()));

        let lease = leader(&coordinator);
        lease.complete(Ok("t2".into()));
        assert_eq!(coordinator.cycles(), 2);
    }

    #[tokio::test]
    async fn concurrent_waiters_all_receive_outcome() {
        let coordinator = RefreshCoordinator::new();
        let lease = leader(&coordinator);

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let w = waiter(&coordinator);
                tokio::spawn(async move { w.wait().await })
            })
            .collect();
        assert_eq!(coordinator.queued(), 5);

        lease.complete(Ok("tok".into()));
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "tok");
        }
    }
}
