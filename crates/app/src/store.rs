//! Application state store.
//!
//! Holds the process-wide session and cart badge count. Components receive the
//! store by `Arc` and either read it directly or [`AppStore::subscribe`] to be
//! told about changes.

use tokio::sync::watch;
use tracing::debug;

use crate::domain::session::models::UserSession;

/// Point-in-time copy of the store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Signed-in user, `None` for guests.
    pub session: Option<UserSession>,

    /// Total quantity shown on the cart badge.
    pub cart_count: u64,
}

/// Shared, observable application state.
#[derive(Debug)]
pub struct AppStore {
    state: watch::Sender<StoreSnapshot>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    /// Create an empty store: no session, zero items.
    #[must_use]
    pub fn new() -> Self {
        let (state, _initial) = watch::channel(StoreSnapshot::default());

        Self { state }
    }

    /// Signed-in user, if any.
    pub fn session(&self) -> Option<UserSession> {
        self.state.borrow().session.clone()
    }

    /// Whether a user session is present.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_some()
    }

    /// Record a signed-in user.
    pub fn sign_in(&self, user: UserSession) {
        debug!(user = %user.id, "session started");

        self.state.send_modify(|state| state.session = Some(user));
    }

    /// Drop the current session.
    pub fn sign_out(&self) {
        self.state.send_if_modified(|state| state.session.take().is_some());
    }

    /// Current cart badge count.
    pub fn cart_count(&self) -> u64 {
        self.state.borrow().cart_count
    }

    /// Replace the cart badge count, notifying subscribers only on change.
    pub fn set_cart_count(&self, count: u64) {
        self.state.send_if_modified(|state| {
            if state.cart_count == count {
                return false;
            }

            state.cart_count = count;

            true
        });
    }

    /// Receiver that observes every change to the store.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }
}
