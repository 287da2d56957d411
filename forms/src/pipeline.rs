//! Submission pipeline.
//!
//! One submission runs `pre_submit → operation → post_submit | on_error`.
//! Every hook has a default, so a form works with [`DefaultHooks`] and
//! callers override only the steps they need.

use crate::form::FormAction;
use crate::remote::{RemoteError, RemoteOperation, RemoteResponse, SubmitParams};
use crate::values::FormValues;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;

/// Body key whose message belongs to the form rather than a field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// An error as sent by the server: usually a string or a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMessage(pub Value);

impl ErrorMessage {
    /// Message from plain text.
    #[must_use]
    pub fn text(message: impl Into<String>) -> Self {
        Self(Value::String(message.into()))
    }

    /// Display lines: a string is one line, a list gives one line per
    /// entry, anything else is its JSON text.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        fn line(value: &Value) -> String {
            match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            }
        }
        match &self.0 {
            Value::Array(items) => items.iter().map(line).collect(),
            other => vec![line(other)],
        }
    }
}

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.messages().join(" "))
    }
}

/// Errors to display after a failed submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionErrors {
    /// Messages per field
    pub fields: BTreeMap<String, ErrorMessage>,
    /// Message for the whole form
    pub form: Option<ErrorMessage>,
}

impl SubmissionErrors {
    /// Only a form-level message.
    #[must_use]
    pub fn form(message: ErrorMessage) -> Self {
        Self {
            fields: BTreeMap::new(),
            form: Some(message),
        }
    }

    /// True when nothing would be displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_none()
    }
}

/// Why a submission failed.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitFailure {
    /// The operation answered with a non-ok response.
    Rejected(RemoteResponse),
    /// The operation or a hook raised an error.
    Thrown(RemoteError),
}

impl SubmitFailure {
    /// Response body associated with the failure, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Rejected(response) => Some(&response.body),
            Self::Thrown(error) => error.response.as_ref().map(|response| &response.body),
        }
    }

    /// One-line description for logs and fallback messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Rejected(response) => format!("Request failed with status {}", response.status),
            Self::Thrown(error) => error.message.clone(),
        }
    }
}

/// Map a failure to displayable errors.
///
/// An object body maps key by key onto fields, with `form_key` going to the
/// form. Any other non-null body becomes the form message. Without a usable
/// body the failure description is the form message, so no failure is ever
/// silent.
#[must_use]
pub fn map_errors(failure: &SubmitFailure, form_key: &str) -> SubmissionErrors {
    let mut errors = SubmissionErrors::default();
    match failure.body() {
        Some(Value::Object(body)) => {
            for (key, message) in body {
                let message = ErrorMessage(message.clone());
                if key == form_key {
                    errors.form = Some(message);
                } else {
                    errors.fields.insert(key.clone(), message);
                }
            }
        },
        Some(Value::Null) | None => {},
        Some(other) => errors.form = Some(ErrorMessage(other.clone())),
    }
    if errors.is_empty() {
        errors.form = Some(ErrorMessage::text(failure.describe()));
    }
    errors
}

/// Customization points of a submission.
///
/// # Example
///
/// ```ignore
/// struct StampOwner { owner: String }
///
/// impl SubmissionHooks for StampOwner {
///     fn pre_submit(&self, mut values: FormValues)
///         -> impl Future<Output = Result<SubmitParams, RemoteError>> + Send
///     {
///         values.insert("owner".into(), self.owner.clone().into());
///         async move { Ok(SubmitParams::with_body(values)) }
///     }
/// }
/// ```
pub trait SubmissionHooks: Send + Sync {
    /// Turn values into operation parameters. Errors are routed to
    /// [`SubmissionHooks::on_error`] and the operation is not called.
    fn pre_submit(
        &self,
        values: FormValues,
    ) -> impl Future<Output = Result<SubmitParams, RemoteError>> + Send {
        async move { Ok(SubmitParams::with_body(values)) }
    }

    /// React to an ok response. `values` are the form's values when the
    /// response arrived; the returned action is sent to the form.
    ///
    /// By default the form is re-initialized with those values, which
    /// clears the dirty state.
    fn post_submit(
        &self,
        response: &RemoteResponse,
        values: FormValues,
    ) -> impl Future<Output = Option<FormAction>> + Send {
        let _ = response;
        async move { Some(FormAction::Initialize { values }) }
    }

    /// Map a failure to displayable errors.
    fn on_error(&self, failure: SubmitFailure) -> impl Future<Output = SubmissionErrors> + Send {
        async move { map_errors(&failure, NON_FIELD_ERRORS) }
    }
}

/// Hooks with every default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl SubmissionHooks for DefaultHooks {}

/// Result of the request half of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The operation answered ok.
    Succeeded(RemoteResponse),
    /// Some step failed; errors are already mapped.
    Failed(SubmissionErrors),
}

/// Run `pre_submit`, the operation, and `on_error` on failure.
///
/// `post_submit` runs later, against the form's values at completion time.
pub async fn run_submission<O, H>(operation: &O, hooks: &H, values: FormValues) -> SubmissionOutcome
where
    O: RemoteOperation,
    H: SubmissionHooks,
{
    let failure = match hooks.pre_submit(values).await {
        Err(error) => SubmitFailure::Thrown(error),
        Ok(params) => match operation.call(params).await {
            Ok(response) if response.ok => return SubmissionOutcome::Succeeded(response),
            Ok(response) => SubmitFailure::Rejected(response),
            Err(error) => SubmitFailure::Thrown(error),
        },
    };

    tracing::debug!(failure = %failure.describe(), "Submission failed");
    SubmissionOutcome::Failed(hooks.on_error(failure).await)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use crate::mocks::MockRemote;
    use serde_json::json;

    fn values() -> FormValues {
        let Value::Object(map) = json!({"username": "ann", "password": "pw"}) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn object_body_maps_onto_fields_and_form() {
        let failure = SubmitFailure::Rejected(RemoteResponse::new(
            400,
            json!({"title": ["This field may not be blank."], "non_field_errors": ["Nope"]}),
        ));

        let errors = map_errors(&failure, NON_FIELD_ERRORS);
        assert_eq!(errors.fields["title"].messages(), ["This field may not be blank."]);
        assert_eq!(errors.form, Some(ErrorMessage(json!(["Nope"]))));
        assert!(!errors.fields.contains_key(NON_FIELD_ERRORS));
    }

    #[test]
    fn text_body_becomes_form_error() {
        let failure = SubmitFailure::Rejected(RemoteResponse::new(403, json!("Not allowed")));
        assert_eq!(
            map_errors(&failure, NON_FIELD_ERRORS),
            SubmissionErrors::form(ErrorMessage::text("Not allowed"))
        );
    }

    #[test]
    fn failure_without_body_is_never_silent() {
        let thrown = SubmitFailure::Thrown(RemoteError::new("connection refused"));
        assert_eq!(
            map_errors(&thrown, NON_FIELD_ERRORS).form,
            Some(ErrorMessage::text("connection refused"))
        );

        let empty = SubmitFailure::Rejected(RemoteResponse::new(500, json!({})));
        assert_eq!(
            map_errors(&empty, NON_FIELD_ERRORS).form,
            Some(ErrorMessage::text("Request failed with status 500"))
        );
    }

    #[test]
    fn error_message_lines() {
        assert_eq!(ErrorMessage(json!(["a", "b"])).messages(), ["a", "b"]);
        assert_eq!(ErrorMessage(json!(3)).messages(), ["3"]);
        assert_eq!(ErrorMessage(json!(["a", "b"])).to_string(), "a b");
    }

    #[tokio::test]
    async fn default_pre_submit_sends_values_as_body() {
        let remote = MockRemote::new();
        let outcome = run_submission(&remote, &DefaultHooks, values()).await;

        assert!(matches!(outcome, SubmissionOutcome::Succeeded(_)));
        let calls = remote.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].request_body, Some(Value::Object(values())));
    }

    #[tokio::test]
    async fn rejected_response_goes_through_on_error() {
        let remote = MockRemote::new();
        remote.respond_with(RemoteResponse::new(400, json!({"username": ["taken"]})));

        let SubmissionOutcome::Failed(errors) = run_submission(&remote, &DefaultHooks, values()).await
        else {
            unreachable!("response was rejected")
        };
        assert_eq!(errors.fields["username"].messages(), ["taken"]);
    }

    struct FailingPreSubmit;

    impl SubmissionHooks for FailingPreSubmit {
        fn pre_submit(
            &self,
            _values: FormValues,
        ) -> impl Future<Output = Result<SubmitParams, RemoteError>> + Send {
            async { Err(RemoteError::new("could not prepare")) }
        }
    }

    #[tokio::test]
    async fn pre_submit_error_skips_the_operation() {
        let remote = MockRemote::new();
        let outcome = run_submission(&remote, &FailingPreSubmit, values()).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed(SubmissionErrors::form(ErrorMessage::text("could not prepare")))
        );
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn default_post_submit_reinitializes() {
        let action = DefaultHooks
            .post_submit(&RemoteResponse::ok(json!({})), values())
            .await;
        assert_eq!(action, Some(FormAction::Initialize { values: values() }));
    }
}
