//! Leave guard that records every update.

use super::lock;
use crate::guard::LeaveGuard;
use std::sync::Mutex;

/// Records `(block, message)` pairs in call order.
#[derive(Debug, Default)]
pub struct RecordingLeaveGuard {
    updates: Mutex<Vec<(bool, String)>>,
}

impl RecordingLeaveGuard {
    /// Guard with no updates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update so far.
    #[must_use]
    pub fn updates(&self) -> Vec<(bool, String)> {
        lock(&self.updates).clone()
    }

    /// The latest update.
    #[must_use]
    pub fn last(&self) -> Option<(bool, String)> {
        lock(&self.updates).last().cloned()
    }

    /// Whether navigation is currently blocked.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.last().is_some_and(|(block, _)| block)
    }
}

impl LeaveGuard for RecordingLeaveGuard {
    fn update(&self, block: bool, message: &str) {
        lock(&self.updates).push((block, message.to_string()));
    }
}
