//! In-memory session.

use super::lock;
use crate::session::Session;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Session with a settable user and a refresh counter.
#[derive(Debug, Default)]
pub struct MockSession {
    user: Mutex<Option<Value>>,
    refreshes: AtomicUsize,
}

impl MockSession {
    /// Logged-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current user.
    pub fn set_user(&self, user: Option<Value>) {
        *lock(&self.user) = user;
    }

    /// Number of refreshes so far.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl Session for MockSession {
    fn current_user(&self) -> Option<Value> {
        lock(&self.user).clone()
    }

    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}
