//! Navigation leave guard.

/// Receives the form's navigation-blocking decision.
///
/// Called only when the decision changes, and once with `false` when the
/// form unmounts.
pub trait LeaveGuard: Send + Sync {
    /// Block or release navigation away from the form.
    fn update(&self, block: bool, message: &str);
}

/// Guard that ignores every update, for forms without navigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLeaveGuard;

impl LeaveGuard for NoopLeaveGuard {
    fn update(&self, block: bool, _message: &str) {
        tracing::trace!(block, "Leave guard update ignored");
    }
}
