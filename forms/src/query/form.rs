//! Query form state machine.

use super::state::{Location, QueryState};
use crate::binder::{FieldChange, Fields};
use crate::config::QueryFormConfig;
use crate::introspect::FieldDescriptor;
use crate::remote::{DataSource, RemoteError, RemoteResponse, RemoteResult};
use schemaform_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Identity of the latest list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKey {
    /// Request number
    pub generation: u64,
    /// Parameters it was made with
    pub params: QueryState,
}

/// State of a URL-synchronized list query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFormState {
    /// Parameters read from the URL
    pub values: QueryState,
    /// Filter edits not yet submitted
    pub draft: QueryState,
    /// Filter field descriptors
    pub descriptors: Arc<[FieldDescriptor]>,
    /// List data
    pub result: RemoteResult,
    /// Latest request made
    pub request: Option<RequestKey>,
    /// Requests made so far
    pub generation: u64,
    /// False after unmount; late results are ignored
    pub mounted: bool,
}

impl QueryFormState {
    /// State before the first URL read.
    #[must_use]
    pub fn new(descriptors: Arc<[FieldDescriptor]>) -> Self {
        Self {
            values: QueryState::new(),
            draft: QueryState::new(),
            descriptors,
            result: RemoteResult::pending(),
            request: None,
            generation: 0,
            mounted: true,
        }
    }

    /// Filter fields bound to the draft values.
    #[must_use]
    pub fn fields(&self) -> Fields {
        Fields::bind(&self.descriptors, &self.draft.to_values(), &BTreeMap::new())
    }

    /// Draft differs from the URL.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.draft != self.values
    }
}

/// Every input a query form reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFormAction {
    /// Read the URL and load data for it.
    Mount,
    /// The URL changed outside the controller (back button, link).
    LocationChanged,
    /// Reload data for the current URL even if already loaded.
    Refresh,
    /// A filter field was edited.
    FieldChanged {
        /// Query key
        key: String,
        /// New text
        value: String,
    },
    /// Push the draft filters to the URL.
    Submit,
    /// Go to a page.
    ChangePage {
        /// Page number as sent in the URL
        page: String,
    },
    /// Change the page size.
    ChangePageSize {
        /// Page size as sent in the URL
        page_size: String,
    },
    /// Change the ordering.
    Reorder {
        /// Ordering expression, for example `-created`
        ordering: String,
    },
    /// The view is going away.
    Unmount,
    /// A load finished.
    Fetched {
        /// Request this completes
        generation: u64,
        /// Outcome
        outcome: Result<RemoteResponse, RemoteError>,
    },
}

impl From<FieldChange> for QueryFormAction {
    fn from(change: FieldChange) -> Self {
        let value = match change.value {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Self::FieldChanged {
            key: change.name,
            value,
        }
    }
}

/// Capabilities a query form reducer uses.
pub struct QueryFormEnvironment<D> {
    /// Loads list data
    pub source: Arc<D>,
    /// Current URL
    pub location: Arc<dyn Location>,
    /// Field names and mutation flags
    pub config: QueryFormConfig,
}

impl<D> QueryFormEnvironment<D> {
    /// Create an environment.
    pub fn new(source: Arc<D>, location: Arc<dyn Location>, config: QueryFormConfig) -> Self {
        Self {
            source,
            location,
            config,
        }
    }
}

impl<D> Clone for QueryFormEnvironment<D> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            location: Arc::clone(&self.location),
            config: self.config.clone(),
        }
    }
}

/// Reducer for URL-synchronized list queries.
///
/// The URL is the source of truth: every mutation writes the location and
/// then re-reads it. A load is started only when the URL parameters differ
/// from the latest request's, unless forced, and only the latest request's
/// result is applied.
pub struct QueryFormReducer<D> {
    _phantom: PhantomData<fn() -> D>,
}

impl<D> QueryFormReducer<D> {
    /// Create a new reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<D> Default for QueryFormReducer<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for QueryFormReducer<D> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<D> std::fmt::Debug for QueryFormReducer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("QueryFormReducer")
    }
}

impl<D: DataSource + 'static> QueryFormReducer<D> {
    /// Re-read the URL, reset the draft and load if needed.
    fn synchronize(
        state: &mut QueryFormState,
        env: &QueryFormEnvironment<D>,
        force: bool,
    ) -> Effect<QueryFormAction> {
        state.values = QueryState::parse(&env.location.search());
        state.draft = state.values.clone();

        let already_requested = state
            .request
            .as_ref()
            .is_some_and(|request| request.params == state.values);
        if already_requested && !force {
            tracing::trace!(params = %state.values, "Load skipped, parameters unchanged");
            return Effect::None;
        }

        state.generation += 1;
        let generation = state.generation;
        let params = state.values.clone();
        state.request = Some(RequestKey {
            generation,
            params: params.clone(),
        });
        state.result.begin();

        tracing::debug!(generation, params = %params, "Loading list");

        let source = Arc::clone(&env.source);
        async_effect! {
            let outcome = source.fetch(params).await;
            Some(QueryFormAction::Fetched { generation, outcome })
        }
    }

    /// Write `next` to the URL, then synchronize with a forced load.
    fn navigate(
        state: &mut QueryFormState,
        env: &QueryFormEnvironment<D>,
        next: &QueryState,
    ) -> Effect<QueryFormAction> {
        env.location.push(&next.to_search());
        Self::synchronize(state, env, true)
    }

    /// Current URL parameters with one key replaced.
    fn with_param(env: &QueryFormEnvironment<D>, key: &str, value: String) -> QueryState {
        QueryState::parse(&env.location.search()).with(key, value)
    }
}

impl<D: DataSource + 'static> Reducer for QueryFormReducer<D> {
    type State = QueryFormState;
    type Action = QueryFormAction;
    type Environment = QueryFormEnvironment<D>;

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
            QueryFormAction::Mount | QueryFormAction::LocationChanged => {
                Self::synchronize(state, env, false)
            },

            QueryFormAction::Refresh => Self::synchronize(state, env, true),

            QueryFormAction::FieldChanged { key, value } => {
                if env.config.applies_immediately(&key) {
                    let next = Self::with_param(env, &key, value);
                    Self::navigate(state, env, &next)
                } else {
                    state.draft.set(key, value);
                    Effect::None
                }
            },

            QueryFormAction::Submit => {
                let next: QueryState = QueryState::parse(&env.location.search())
                    .merged(&state.draft)
                    .iter()
                    .filter(|(_, value)| !value.is_empty())
                    .collect();
                Self::navigate(state, env, &next)
            },

            QueryFormAction::ChangePage { page } => {
                if !env.config.paginated {
                    tracing::debug!("Page change ignored, pagination disabled");
                    return smallvec![Effect::None];
                }
                let next = Self::with_param(env, &env.config.page_field, page);
                Self::navigate(state, env, &next)
            },

            QueryFormAction::ChangePageSize { page_size } => {
                if !env.config.paginated {
                    tracing::debug!("Page size change ignored, pagination disabled");
                    return smallvec![Effect::None];
                }
                let next = Self::with_param(env, &env.config.page_size_field, page_size);
                Self::navigate(state, env, &next)
            },

            QueryFormAction::Reorder { ordering } => {
                if !env.config.orderable {
                    tracing::debug!("Reorder ignored, ordering disabled");
                    return smallvec![Effect::None];
                }
                let next = Self::with_param(env, &env.config.ordering_field, ordering);
                Self::navigate(state, env, &next)
            },

            QueryFormAction::Unmount => {
                state.mounted = false;
                tracing::debug!("Query form unmounted");
                Effect::None
            },

            QueryFormAction::Fetched {
                generation,
                outcome,
            } => {
                let latest = state.request.as_ref().map(|request| request.generation);
                if latest != Some(generation) {
                    tracing::debug!(generation, "Stale list result dropped");
                    return smallvec![Effect::None];
                }
                if let Err(error) = &outcome {
                    tracing::warn!(error = %error, "List load failed");
                }
                state.result.complete(outcome);
                Effect::None
            },
        };

        smallvec![effect]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use crate::mocks::{MemoryLocation, MockDataSource};
    use schemaform_testing::{assertions, block_on_actions, ReducerTest};
    use serde_json::json;

    fn env_with(
        source: &MockDataSource,
        location: &Arc<MemoryLocation>,
        config: QueryFormConfig,
    ) -> QueryFormEnvironment<MockDataSource> {
        QueryFormEnvironment::new(
            Arc::new(source.clone()),
            Arc::clone(location) as Arc<dyn Location>,
            config,
        )
    }

    fn state() -> QueryFormState {
        QueryFormState::new(Arc::from(Vec::new()))
    }

    fn filtered_state() -> QueryFormState {
        let filters: crate::schema::Schema = serde_json::from_value(json!({
            "properties": {"search": {"type": "string"}}
        }))
        .unwrap();
        QueryFormState::new(crate::introspect::field_descriptors(&filters).into())
    }

    #[test]
    fn mount_reads_url_and_loads() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("?search=milk"));

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env_with(&source, &location, QueryFormConfig::default()))
            .given_state(state())
            .when_action(QueryFormAction::Mount)
            .then_state(|state| {
                assert_eq!(state.values.get("search"), Some("milk"));
                assert_eq!(state.draft, state.values);
                assert!(state.result.loading);
                assert_eq!(state.generation, 1);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn unchanged_location_does_not_reload() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("page=1"));

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env_with(&source, &location, QueryFormConfig::default()))
            .given_state(state())
            .when_action(QueryFormAction::Mount)
            .when_action(QueryFormAction::LocationChanged)
            .then_state(|state| assert_eq!(state.generation, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn refresh_reloads_same_parameters() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("page=1"));

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env_with(&source, &location, QueryFormConfig::default()))
            .given_state(state())
            .when_action(QueryFormAction::Mount)
            .when_action(QueryFormAction::Refresh)
            .then_state(|state| assert_eq!(state.generation, 2))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn change_page_pushes_url_and_keeps_other_params() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("search=milk&page=1"));
        let env = env_with(&source, &location, QueryFormConfig::default().paginated());
        let reducer = QueryFormReducer::new();
        let mut state = state();

        reducer.reduce(&mut state, QueryFormAction::Mount, &env);
        let effects = reducer.reduce(&mut state, QueryFormAction::ChangePage { page: "3".into() }, &env);

        assert_eq!(location.search(), "search=milk&page=3");
        assert_eq!(state.values.get("page"), Some("3"));

        let actions = block_on_actions(effects);
        assert_eq!(source.requests().last().unwrap().get("page"), Some("3"));
        assert!(matches!(
            actions.as_slice(),
            [QueryFormAction::Fetched { generation: 2, .. }]
        ));
    }

    #[test]
    fn mutations_disabled_by_config_are_ignored() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new(""));

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env_with(&source, &location, QueryFormConfig::default()))
            .given_state(state())
            .when_action(QueryFormAction::Reorder {
                ordering: "-created".into(),
            })
            .then_state(|state| assert!(state.request.is_none()))
            .then_effects(assertions::assert_no_effects)
            .run();

        assert_eq!(location.search(), "");
    }

    #[test]
    fn filter_edits_stay_in_draft_until_submit() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("page=2"));
        let env = env_with(&source, &location, QueryFormConfig::default().paginated());
        let reducer = QueryFormReducer::new();
        let mut state = filtered_state();

        reducer.reduce(&mut state, QueryFormAction::Mount, &env);
        reducer.reduce(
            &mut state,
            QueryFormAction::FieldChanged {
                key: "search".into(),
                value: "eggs".into(),
            },
            &env,
        );
        assert!(state.is_dirty());
        assert_eq!(location.search(), "page=2");
        assert_eq!(state.fields().get("search").unwrap().value, json!("eggs"));

        reducer.reduce(&mut state, QueryFormAction::Submit, &env);
        assert_eq!(location.search(), "page=2&search=eggs");
        assert!(!state.is_dirty());
    }

    #[test]
    fn cleared_filter_is_dropped_from_url() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("search=milk&page=2"));
        let env = env_with(&source, &location, QueryFormConfig::default().paginated());
        let reducer = QueryFormReducer::new();
        let mut state = filtered_state();

        reducer.reduce(&mut state, QueryFormAction::Mount, &env);
        reducer.reduce(
            &mut state,
            QueryFormAction::FieldChanged {
                key: "search".into(),
                value: String::new(),
            },
            &env,
        );
        reducer.reduce(&mut state, QueryFormAction::Submit, &env);

        assert_eq!(location.search(), "page=2");
        assert_eq!(state.values.get("search"), None);
    }

    #[test]
    fn url_parameters_are_not_fields_without_filters() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("search=milk&page=2"));

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env_with(&source, &location, QueryFormConfig::default()))
            .given_state(state())
            .when_action(QueryFormAction::Mount)
            .then_state(|state| {
                assert_eq!(state.values.len(), 2);
                assert!(state.fields().is_empty());
            })
            .run();
    }

    #[test]
    fn page_field_change_applies_immediately_when_paginated() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("page=1"));
        let env = env_with(&source, &location, QueryFormConfig::default().paginated());

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env)
            .given_state(state())
            .when_action(QueryFormAction::FieldChanged {
                key: "page_size".into(),
                value: "50".into(),
            })
            .then_state(|state| assert_eq!(state.values.get("page_size"), Some("50")))
            .then_effects(assertions::assert_has_future_effect)
            .run();

        assert_eq!(location.search(), "page=1&page_size=50");
    }

    #[test]
    fn only_latest_result_is_applied() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new("page=1"));

        let mut given = state();
        given.generation = 2;
        given.request = Some(RequestKey {
            generation: 2,
            params: QueryState::parse("page=2"),
        });

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env_with(&source, &location, QueryFormConfig::default()))
            .given_state(given)
            .when_action(QueryFormAction::Fetched {
                generation: 1,
                outcome: Ok(RemoteResponse::ok(json!({"results": ["stale"]}))),
            })
            .when_action(QueryFormAction::Fetched {
                generation: 2,
                outcome: Ok(RemoteResponse::ok(json!({"results": ["fresh"]}))),
            })
            .then_state(|state| {
                assert_eq!(state.result.data, Some(json!({"results": ["fresh"]})));
                assert!(!state.result.loading);
            })
            .run();
    }

    #[test]
    fn failed_load_sets_error() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new(""));
        let mut given = state();
        given.request = Some(RequestKey {
            generation: 1,
            params: QueryState::new(),
        });

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env_with(&source, &location, QueryFormConfig::default()))
            .given_state(given)
            .when_action(QueryFormAction::Fetched {
                generation: 1,
                outcome: Err(RemoteError::new("offline")),
            })
            .then_state(|state| {
                assert_eq!(state.result.error, Some(RemoteError::new("offline")));
                assert!(state.result.data.is_none());
            })
            .run();
    }

    #[test]
    fn unmount_drops_late_results() {
        let source = MockDataSource::new();
        let location = Arc::new(MemoryLocation::new(""));

        ReducerTest::new(QueryFormReducer::new())
            .with_env(env_with(&source, &location, QueryFormConfig::default()))
            .given_state(state())
            .when_action(QueryFormAction::Mount)
            .when_action(QueryFormAction::Unmount)
            .when_action(QueryFormAction::Fetched {
                generation: 1,
                outcome: Ok(RemoteResponse::ok(json!([]))),
            })
            .then_state(|state| {
                assert!(!state.mounted);
                assert!(state.result.data.is_none());
            })
            .run();
    }
}
