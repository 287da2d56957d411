//! Form reducer.

use super::{FormAction, FormEnvironment, FormState};
use crate::pipeline::{run_submission, SubmissionHooks, SubmissionOutcome};
use crate::remote::RemoteOperation;
use schemaform_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Reducer for schema-driven forms.
///
/// Submissions are numbered; a completion whose number is not the latest
/// is dropped. Once unmounted the form ignores every action.
///
/// The leave guard is notified from inside the reducer, under the store's
/// state lock, so guard updates arrive in the order the decisions were made.
pub struct FormReducer<O, H> {
    _phantom: PhantomData<fn() -> (O, H)>,
}

impl<O, H> FormReducer<O, H> {
    /// Create a new reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<O, H> Default for FormReducer<O, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, H> Clone for FormReducer<O, H> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<O, H> std::fmt::Debug for FormReducer<O, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FormReducer")
    }
}

impl<O, H> FormReducer<O, H>
where
    O: RemoteOperation + 'static,
    H: SubmissionHooks + 'static,
{
    fn submit(state: &mut FormState, env: &FormEnvironment<O, H>) -> Effect<FormAction> {
        if !state.can_submit() {
            tracing::warn!(
                submitting = state.submitting,
                loading = state.loading(),
                "Submit ignored"
            );
            return Effect::None;
        }

        state.validation_errors = env.validators.validate_all(&state.values);
        if !state.validation_errors.is_empty() {
            tracing::debug!(
                invalid_fields = state.validation_errors.len(),
                "Submit blocked by validation"
            );
            return Effect::None;
        }

        state.submitting = true;
        state.submit_succeeded = false;
        state.clear_submit_errors();
        state.submit_generation += 1;

        let generation = state.submit_generation;
        let operation = Arc::clone(&env.operation);
        let hooks = Arc::clone(&env.hooks);
        let values = state.values.clone();

        tracing::debug!(generation, "Submitting form");

        async_effect! {
            let action = match run_submission(&*operation, &*hooks, values).await {
                SubmissionOutcome::Succeeded(response) => {
                    FormAction::SubmitSucceeded { generation, response }
                },
                SubmissionOutcome::Failed(errors) => FormAction::SubmitFailed { generation, errors },
            };
            Some(action)
        }
    }

    /// Re-initialize when the resolved baseline moved.
    fn refresh_baseline(state: &mut FormState) {
        let resolved = state.resolved_initial_values();
        if resolved != state.initial_values {
            state.initialize(resolved);
        }
    }

    fn notify_leave_guard(state: &mut FormState, env: &FormEnvironment<O, H>) {
        let block = state.should_block(&env.config.prompt_policy);
        if block != state.blocking_navigation {
            state.blocking_navigation = block;
            env.leave_guard.update(block, &env.config.prompt_message);
        }
    }
}

impl<O, H> Reducer for FormReducer<O, H>
where
    O: RemoteOperation + 'static,
    H: SubmissionHooks + 'static,
{
    type State = FormState;
    type Action = FormAction;
    type Environment = FormEnvironment<O, H>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if !state.mounted {
            tracing::trace!(?action, "Action ignored after unmount");
            return smallvec![Effect::None];
        }

        let effect = match action {
            FormAction::FieldChanged { name, value } => {
                state.values.insert(name.clone(), value);
                match env.validators.validate_field(&name, &state.values) {
                    Some(error) => {
                        state.validation_errors.insert(name, error);
                    },
                    None => {
                        state.validation_errors.remove(&name);
                    },
                }
                Effect::None
            },

            FormAction::Submit => Self::submit(state, env),

            FormAction::Initialize { values } => {
                state.initialize(values);
                Effect::None
            },

            FormAction::Reset => {
                state.values = state.initial_values.clone();
                state.validation_errors.clear();
                state.clear_submit_errors();
                state.submit_succeeded = false;
                Effect::None
            },

            FormAction::InitialDataChanged { data } => {
                state.initial_data = Some(data);
                if !state.loading() {
                    Self::refresh_baseline(state);
                }
                Effect::None
            },

            FormAction::SchemaChanged { schema } => {
                if schema != state.schema {
                    state.apply_schema(schema, env.clock.as_ref());
                    Self::refresh_baseline(state);
                }
                Effect::None
            },

            FormAction::Unmount => {
                state.mounted = false;
                state.submitting = false;
                state.blocking_navigation = false;
                env.leave_guard.update(false, &env.config.prompt_message);
                tracing::debug!("Form unmounted");
                return smallvec![Effect::None];
            },

            FormAction::SubmitSucceeded {
                generation,
                response,
            } => {
                if generation != state.submit_generation {
                    tracing::debug!(generation, "Stale submission result dropped");
                    return smallvec![Effect::None];
                }
                state.last_response = Some(response.clone());

                tracing::info!(status = response.status, "Form submitted");

                let hooks = Arc::clone(&env.hooks);
                let values = state.values.clone();
                async_effect! {
                    let follow_up = hooks.post_submit(&response, values).await;
                    Some(FormAction::SubmitCompleted {
                        generation,
                        follow_up: follow_up.map(Box::new),
                    })
                }
            },

            FormAction::SubmitCompleted {
                generation,
                follow_up,
            } => {
                if generation != state.submit_generation {
                    tracing::debug!(generation, "Stale submission result dropped");
                    return smallvec![Effect::None];
                }
                state.submitting = false;
                state.submit_succeeded = true;

                if let Some(action) = follow_up {
                    return self.reduce(state, *action, env);
                }
                Effect::None
            },

            FormAction::SubmitFailed { generation, errors } => {
                if generation != state.submit_generation {
                    tracing::debug!(generation, "Stale submission result dropped");
                    return smallvec![Effect::None];
                }
                state.submitting = false;
                state.submit_failed = true;
                state.submit_errors = errors.fields;
                state.submit_error = errors.form;

                tracing::warn!(
                    field_errors = state.submit_errors.len(),
                    form_error = state.submit_error.is_some(),
                    "Form submission failed"
                );
                Effect::None
            },
        };

        Self::notify_leave_guard(state, env);
        smallvec![effect]
    }
}
