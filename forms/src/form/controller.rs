//! Form controller: a store-backed handle for one mounted form.

use super::{FormAction, FormEnvironment, FormReducer, FormState};
use crate::binder::{FieldChange, Fields, FormLayout, Validators};
use crate::config::FormConfig;
use crate::error::Result;
use crate::guard::{LeaveGuard, NoopLeaveGuard};
use crate::pipeline::{DefaultHooks, SubmissionHooks};
use crate::remote::{RemoteOperation, RemoteResult};
use crate::schema::Schema;
use crate::values::FormValues;
use schemaform_core::environment::{Clock, SystemClock};
use schemaform_runtime::Store;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

type FormStore<O, H> = Store<FormState, FormAction, FormEnvironment<O, H>, FormReducer<O, H>>;

/// Handle to a mounted form.
///
/// Cloning shares the same form. Commands return once the reducer ran;
/// submissions continue in the background, use [`FormController::settle`]
/// to wait for them.
///
/// # Example
///
/// ```ignore
/// let form = FormController::builder(create_todo)
///     .schema(catalog.schema("TodoRequest")?)
///     .initial_values(values)
///     .build();
///
/// form.change("title", json!("Buy milk")).await?;
/// form.submit().await?;
/// form.settle(Duration::from_secs(5)).await?;
/// ```
pub struct FormController<O, H = DefaultHooks>
where
    O: RemoteOperation + 'static,
    H: SubmissionHooks + 'static,
{
    store: FormStore<O, H>,
}

impl<O, H> Clone for FormController<O, H>
where
    O: RemoteOperation + 'static,
    H: SubmissionHooks + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<O> FormController<O, DefaultHooks>
where
    O: RemoteOperation + 'static,
{
    /// Start building a form that submits to `operation`.
    pub fn builder(operation: O) -> FormBuilder<O, DefaultHooks> {
        FormBuilder {
            operation,
            hooks: DefaultHooks,
            schema: None,
            initial_data: None,
            initial_values: FormValues::new(),
            clock: Arc::new(SystemClock),
            leave_guard: Arc::new(NoopLeaveGuard),
            validators: Validators::default(),
            config: FormConfig::default(),
        }
    }
}

impl<O, H> FormController<O, H>
where
    O: RemoteOperation + 'static,
    H: SubmissionHooks + 'static,
{
    /// Record a field edit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn change(&self, name: impl Into<String>, value: Value) -> Result<()> {
        self.send(FormAction::FieldChanged {
            name: name.into(),
            value,
        })
        .await
    }

    /// Apply a change produced by a bound field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn apply(&self, change: FieldChange) -> Result<()> {
        self.send(change.into()).await
    }

    /// Request a submission. Ignored while submitting or loading.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn submit(&self) -> Result<()> {
        self.send(FormAction::Submit).await
    }

    /// Make `values` the new baseline and current values.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn initialize(&self, values: FormValues) -> Result<()> {
        self.send(FormAction::Initialize { values }).await
    }

    /// Restore the baseline.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn reset(&self) -> Result<()> {
        self.send(FormAction::Reset).await
    }

    /// Report the state of the initial data load.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn set_initial_data(&self, data: RemoteResult) -> Result<()> {
        self.send(FormAction::InitialDataChanged { data }).await
    }

    /// Replace the schema. Descriptors are only recomputed if it differs.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn set_schema(&self, schema: Option<Arc<Schema>>) -> Result<()> {
        self.send(FormAction::SchemaChanged { schema }).await
    }

    /// Tear the form down: release the leave guard and drop every later
    /// completion. Further commands fail.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] if already unmounted.
    pub async fn unmount(&self) -> Result<()> {
        self.send(FormAction::Unmount).await?;
        self.store.close();
        Ok(())
    }

    /// Wait until every running submission step has finished.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] on timeout.
    pub async fn settle(&self, timeout: Duration) -> Result<()> {
        Ok(self.store.settle(timeout).await?)
    }

    /// Snapshot of the state.
    pub async fn state(&self) -> FormState {
        self.store.state(Clone::clone).await
    }

    /// Current values.
    pub async fn values(&self) -> FormValues {
        self.store.state(|state| state.values.clone()).await
    }

    /// Bound fields for custom layouts.
    pub async fn fields(&self) -> Fields {
        self.store.state(FormState::fields).await
    }

    /// Default layout.
    pub async fn layout(&self) -> FormLayout {
        let config = &self.store.environment().config;
        self.store.state(|state| state.layout(config)).await
    }

    /// Whether a submit request would start a submission.
    pub async fn can_submit(&self) -> bool {
        self.store.state(FormState::can_submit).await
    }

    /// Whether values differ from the baseline.
    pub async fn is_dirty(&self) -> bool {
        self.store.state(FormState::is_dirty).await
    }

    /// The leave prompt message while navigation is blocked.
    pub async fn leave_prompt(&self) -> Option<String> {
        let message = &self.store.environment().config.prompt_message;
        self.store
            .state(|state| state.blocking_navigation.then(|| message.clone()))
            .await
    }

    /// Subscribe to completions and follow-up actions.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<FormAction> {
        self.store.subscribe_actions()
    }

    async fn send(&self, action: FormAction) -> Result<()> {
        self.store.send(action).await?;
        Ok(())
    }
}

/// Builder for [`FormController`].
pub struct FormBuilder<O, H> {
    operation: O,
    hooks: H,
    schema: Option<Arc<Schema>>,
    initial_data: Option<RemoteResult>,
    initial_values: FormValues,
    clock: Arc<dyn Clock>,
    leave_guard: Arc<dyn LeaveGuard>,
    validators: Validators,
    config: FormConfig,
}

impl<O, H> FormBuilder<O, H>
where
    O: RemoteOperation + 'static,
    H: SubmissionHooks + 'static,
{
    /// Schema the fields are derived from.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Loaded record to edit. While it is loading, submit is disabled.
    #[must_use]
    pub fn initial_data(mut self, data: RemoteResult) -> Self {
        self.initial_data = Some(data);
        self
    }

    /// Values merged over the loaded record or schema defaults.
    #[must_use]
    pub fn initial_values(mut self, values: FormValues) -> Self {
        self.initial_values = values;
        self
    }

    /// Replace the submission hooks.
    pub fn hooks<H2>(self, hooks: H2) -> FormBuilder<O, H2>
    where
        H2: SubmissionHooks + 'static,
    {
        FormBuilder {
            operation: self.operation,
            hooks,
            schema: self.schema,
            initial_data: self.initial_data,
            initial_values: self.initial_values,
            clock: self.clock,
            leave_guard: self.leave_guard,
            validators: self.validators,
            config: self.config,
        }
    }

    /// Clock for date defaults.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Receiver of navigation-blocking decisions.
    #[must_use]
    pub fn leave_guard(mut self, guard: Arc<dyn LeaveGuard>) -> Self {
        self.leave_guard = guard;
        self
    }

    /// Client-side validators.
    #[must_use]
    pub fn validators(mut self, validators: Validators) -> Self {
        self.validators = validators;
        self
    }

    /// Labels and prompt settings.
    #[must_use]
    pub fn config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Mount the form.
    #[must_use]
    pub fn build(self) -> FormController<O, H> {
        let state = FormState::new(
            self.schema,
            self.initial_data,
            self.initial_values,
            self.clock.as_ref(),
        );
        let env = FormEnvironment::new(
            Arc::new(self.operation),
            Arc::new(self.hooks),
            self.clock,
            self.leave_guard,
        )
        .with_validators(self.validators)
        .with_config(self.config);

        tracing::debug!(fields = state.descriptors.len(), "Form mounted");

        FormController {
            store: Store::new(state, FormReducer::new(), env),
        }
    }
}
