//! Form state.

use crate::binder::{Fields, FormLayout, SubmitControl};
use crate::config::{FormConfig, PromptPolicy};
use crate::introspect::{field_descriptors, initial_values, FieldDescriptor};
use crate::pipeline::ErrorMessage;
use crate::remote::{RemoteResponse, RemoteResult};
use crate::schema::Schema;
use crate::values::{merge, FormValues};
use schemaform_core::environment::Clock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything a form view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Schema the fields are derived from
    pub schema: Option<Arc<Schema>>,
    /// Field descriptors, recomputed only when the schema changes
    pub descriptors: Arc<[FieldDescriptor]>,
    /// Schema defaults, computed with the schema
    pub schema_defaults: FormValues,
    /// Loaded initial data, if the form edits an existing record
    pub initial_data: Option<RemoteResult>,
    /// Caller-supplied initial values, merged over data or defaults
    pub overrides: FormValues,
    /// Baseline the dirty check compares against
    pub initial_values: FormValues,
    /// Current values
    pub values: FormValues,
    /// Client-side validation errors
    pub validation_errors: BTreeMap<String, ErrorMessage>,
    /// Per-field errors of the last failed submission
    pub submit_errors: BTreeMap<String, ErrorMessage>,
    /// Form-level error of the last failed submission
    pub submit_error: Option<ErrorMessage>,
    /// A submission is in flight
    pub submitting: bool,
    /// The last submission succeeded
    pub submit_succeeded: bool,
    /// The last submission failed
    pub submit_failed: bool,
    /// Response of the last successful submission
    pub last_response: Option<RemoteResponse>,
    /// Submissions started; completions of older ones are ignored
    pub submit_generation: u64,
    /// False after unmount; late completions are ignored
    pub mounted: bool,
    /// Whether the leave guard currently blocks navigation
    pub blocking_navigation: bool,
}

impl FormState {
    /// State for a schema, optional loaded data and override values.
    ///
    /// Initial values are `overrides` merged over the loaded data when it
    /// is an object, else over the schema defaults.
    #[must_use]
    pub fn new(
        schema: Option<Arc<Schema>>,
        initial_data: Option<RemoteResult>,
        overrides: FormValues,
        clock: &dyn Clock,
    ) -> Self {
        let mut state = Self {
            initial_data,
            overrides,
            mounted: true,
            ..Self::default()
        };
        state.apply_schema(schema, clock);
        state.reinitialize();
        state
    }

    /// Install a schema, recomputing descriptors and defaults.
    pub(crate) fn apply_schema(&mut self, schema: Option<Arc<Schema>>, clock: &dyn Clock) {
        match &schema {
            Some(schema) => {
                self.descriptors = field_descriptors(schema).into();
                self.schema_defaults = initial_values(schema, clock);
            },
            None => {
                self.descriptors = Arc::from(Vec::new());
                self.schema_defaults = FormValues::new();
            },
        }
        self.schema = schema;
    }

    /// Values the form starts from, given the current inputs.
    #[must_use]
    pub fn resolved_initial_values(&self) -> FormValues {
        let base = match self.initial_data.as_ref().and_then(|data| data.data.as_ref()) {
            Some(Value::Object(data)) => data.clone(),
            _ => self.schema_defaults.clone(),
        };
        merge(base, &self.overrides)
    }

    /// Reset baseline and values to the resolved initial values and clear
    /// every error.
    pub(crate) fn reinitialize(&mut self) {
        let values = self.resolved_initial_values();
        self.initialize(values);
    }

    /// Make `values` both the baseline and the current values.
    pub(crate) fn initialize(&mut self, values: FormValues) {
        self.initial_values.clone_from(&values);
        self.values = values;
        self.validation_errors.clear();
        self.clear_submit_errors();
    }

    pub(crate) fn clear_submit_errors(&mut self) {
        self.submit_errors.clear();
        self.submit_error = None;
        self.submit_failed = false;
    }

    /// Initial data is still loading.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.initial_data.as_ref().is_some_and(|data| data.loading)
    }

    /// Some value differs from the baseline.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.values != self.initial_values
    }

    /// A submit request would start a submission.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.mounted && !self.submitting && !self.loading()
    }

    /// Errors shown per field: validation errors win over submit errors.
    #[must_use]
    pub fn field_errors(&self) -> BTreeMap<String, ErrorMessage> {
        let mut errors = self.submit_errors.clone();
        errors.extend(
            self.validation_errors
                .iter()
                .map(|(name, error)| (name.clone(), error.clone())),
        );
        errors
    }

    /// Bound fields, in schema order.
    #[must_use]
    pub fn fields(&self) -> Fields {
        Fields::bind(&self.descriptors, &self.values, &self.field_errors())
    }

    /// Form-level message: the submit error followed by submit errors for
    /// names that have no field, such as a `detail` on 401 or 403.
    #[must_use]
    pub fn form_error(&self) -> Option<ErrorMessage> {
        let unplaced: Vec<&ErrorMessage> = self
            .submit_errors
            .iter()
            .filter(|(name, _)| !self.descriptors.iter().any(|field| &field.name == *name))
            .map(|(_, error)| error)
            .collect();
        if unplaced.is_empty() {
            return self.submit_error.clone();
        }

        let lines = self
            .submit_error
            .iter()
            .chain(unplaced)
            .flat_map(ErrorMessage::messages)
            .map(Value::String)
            .collect();
        Some(ErrorMessage(Value::Array(lines)))
    }

    /// Default layout of the whole form.
    #[must_use]
    pub fn layout(&self, config: &FormConfig) -> FormLayout {
        FormLayout {
            form_error: self.form_error(),
            fields: self.fields(),
            submit: SubmitControl {
                label: config.submit_label.clone(),
                disabled: !self.can_submit(),
            },
        }
    }

    /// Whether navigation away should be blocked under `policy`.
    #[must_use]
    pub fn should_block(&self, policy: &PromptPolicy) -> bool {
        self.mounted && policy.should_block(self)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use schemaform_testing::test_clock;
    use serde_json::json;

    fn schema() -> Arc<Schema> {
        Arc::new(
            serde_json::from_value(json!({
                "properties": {
                    "title": {"type": "string"},
                    "done": {"type": "boolean"}
                }
            }))
            .unwrap(),
        )
    }

    fn object(value: Value) -> FormValues {
        let Value::Object(map) = value else {
            unreachable!()
        };
        map
    }

    #[test]
    fn overrides_merge_over_schema_defaults() {
        let state = FormState::new(
            Some(schema()),
            None,
            object(json!({"done": true})),
            &test_clock(),
        );

        assert_eq!(state.values, object(json!({"title": "", "done": true})));
        assert!(!state.is_dirty());
    }

    #[test]
    fn loaded_data_replaces_schema_defaults() {
        let state = FormState::new(
            Some(schema()),
            Some(RemoteResult::loaded(json!({"title": "milk", "done": false}))),
            object(json!({"done": true})),
            &test_clock(),
        );

        assert_eq!(state.values, object(json!({"title": "milk", "done": true})));
    }

    #[test]
    fn pending_data_disables_submit() {
        let state = FormState::new(Some(schema()), Some(RemoteResult::pending()), FormValues::new(), &test_clock());

        assert!(state.loading());
        assert!(!state.can_submit());
        assert_eq!(state.values, object(json!({"title": "", "done": false})));
        assert!(state.layout(&FormConfig::default()).submit.disabled);
    }

    #[test]
    fn errors_without_a_field_join_the_form_error() {
        let mut state = FormState::new(Some(schema()), None, FormValues::new(), &test_clock());
        state.submit_errors.insert(
            "detail".into(),
            ErrorMessage::text("Authentication credentials were not provided."),
        );
        state.submit_errors.insert("title".into(), ErrorMessage::text("Too short."));

        let layout = state.layout(&FormConfig::default());
        assert_eq!(
            layout.form_error,
            Some(ErrorMessage(json!(["Authentication credentials were not provided."])))
        );
        assert_eq!(
            layout.fields.get("title").unwrap().error,
            Some(ErrorMessage::text("Too short."))
        );

        state.submit_error = Some(ErrorMessage::text("Check the form."));
        assert_eq!(
            state.form_error().unwrap().messages(),
            ["Check the form.", "Authentication credentials were not provided."]
        );
    }

    #[test]
    fn schemaless_form_has_no_fields() {
        let state = FormState::new(
            None,
            None,
            object(json!({"title": "milk", "note": "two"})),
            &test_clock(),
        );

        assert!(state.fields().is_empty());
        assert_eq!(state.values.len(), 2);
    }

    #[test]
    fn validation_error_wins_over_submit_error() {
        let mut state = FormState::new(Some(schema()), None, FormValues::new(), &test_clock());
        state.submit_errors.insert("title".into(), ErrorMessage::text("server"));
        state.validation_errors.insert("title".into(), ErrorMessage::text("client"));

        assert_eq!(
            state.fields().get("title").unwrap().error,
            Some(ErrorMessage::text("client"))
        );
    }
}
