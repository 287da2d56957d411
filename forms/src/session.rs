//! Session awareness for forms that change who is logged in.

use crate::form::FormAction;
use crate::pipeline::{SubmissionErrors, SubmissionHooks, SubmitFailure};
use crate::remote::{RemoteError, RemoteResponse, SubmitParams};
use crate::values::FormValues;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Read access to the current session plus a way to reload it.
pub trait Session: Send + Sync {
    /// The logged-in user, if any.
    fn current_user(&self) -> Option<Value>;

    /// Reload the session, for example after login or logout.
    fn refresh(&self);
}

/// Hooks that refresh the session after every successful submission and
/// otherwise delegate to `inner`.
///
/// Login and logout forms wrap their hooks in this so the rest of the
/// application sees the new user.
#[derive(Clone)]
pub struct RefreshSession<H> {
    inner: H,
    session: Arc<dyn Session>,
}

impl<H> std::fmt::Debug for RefreshSession<H>
where
    H: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshSession")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<H: SubmissionHooks> RefreshSession<H> {
    /// Wrap `inner`.
    pub fn new(inner: H, session: Arc<dyn Session>) -> Self {
        Self { inner, session }
    }
}

impl<H: SubmissionHooks> SubmissionHooks for RefreshSession<H> {
    fn pre_submit(
        &self,
        values: FormValues,
    ) -> impl Future<Output = Result<SubmitParams, RemoteError>> + Send {
        self.inner.pre_submit(values)
    }

    fn post_submit(
        &self,
        response: &RemoteResponse,
        values: FormValues,
    ) -> impl Future<Output = Option<FormAction>> + Send {
        tracing::debug!("Refreshing session after successful submission");
        self.session.refresh();
        self.inner.post_submit(response, values)
    }

    fn on_error(&self, failure: SubmitFailure) -> impl Future<Output = SubmissionErrors> + Send {
        self.inner.on_error(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockSession;
    use crate::pipeline::DefaultHooks;
    use serde_json::json;

    #[tokio::test]
    async fn post_submit_refreshes_then_delegates() {
        let session = Arc::new(MockSession::new());
        let hooks = RefreshSession::new(DefaultHooks, session.clone());

        let action = hooks
            .post_submit(&RemoteResponse::ok(json!({})), FormValues::new())
            .await;

        assert_eq!(session.refresh_count(), 1);
        assert_eq!(
            action,
            Some(FormAction::Initialize {
                values: FormValues::new()
            })
        );
    }

    #[tokio::test]
    async fn failures_do_not_refresh() {
        let session = Arc::new(MockSession::new());
        let hooks = RefreshSession::new(DefaultHooks, session.clone());

        let errors = hooks
            .on_error(SubmitFailure::Thrown(RemoteError::new("offline")))
            .await;

        assert_eq!(session.refresh_count(), 0);
        assert!(errors.form.is_some());
    }
}
