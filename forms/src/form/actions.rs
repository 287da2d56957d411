//! Form actions.

use crate::binder::FieldChange;
use crate::pipeline::SubmissionErrors;
use crate::remote::{RemoteResponse, RemoteResult};
use crate::schema::Schema;
use crate::values::FormValues;
use serde_json::Value;
use std::sync::Arc;

/// Every input a form reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    // Commands from the view
    /// A field was edited.
    FieldChanged {
        /// Field name
        name: String,
        /// New value
        value: Value,
    },

    /// Submit the current values.
    Submit,

    /// Make `values` both baseline and current values.
    Initialize {
        /// New baseline
        values: FormValues,
    },

    /// Restore the baseline.
    Reset,

    /// The initial data load changed (started, finished or failed).
    InitialDataChanged {
        /// New load state
        data: RemoteResult,
    },

    /// The schema was replaced.
    SchemaChanged {
        /// New schema
        schema: Option<Arc<Schema>>,
    },

    /// The view is going away.
    Unmount,

    // Completions produced by effects
    /// The operation answered ok.
    SubmitSucceeded {
        /// Submission this completes
        generation: u64,
        /// Response
        response: RemoteResponse,
    },

    /// `post_submit` finished; the submission is over.
    SubmitCompleted {
        /// Submission this completes
        generation: u64,
        /// Action returned by `post_submit`, reduced right away
        follow_up: Option<Box<FormAction>>,
    },

    /// The submission failed; errors are mapped.
    SubmitFailed {
        /// Submission this completes
        generation: u64,
        /// Errors to display
        errors: SubmissionErrors,
    },
}

impl From<FieldChange> for FormAction {
    fn from(change: FieldChange) -> Self {
        Self::FieldChanged {
            name: change.name,
            value: change.value,
        }
    }
}
