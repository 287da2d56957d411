//! Query form controller.

use super::form::{QueryFormAction, QueryFormEnvironment, QueryFormReducer, QueryFormState};
use super::state::{Location, QueryState};
use crate::binder::{FieldChange, Fields};
use crate::catalog::ApiCatalog;
use crate::config::QueryFormConfig;
use crate::error::Result;
use crate::introspect::field_descriptors;
use crate::remote::{BoxedOperation, DataSource, OperationSource, RemoteResult};
use crate::schema::Schema;
use schemaform_runtime::Store;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

type QueryStore<D> =
    Store<QueryFormState, QueryFormAction, QueryFormEnvironment<D>, QueryFormReducer<D>>;

/// Handle to a list view whose filters, page and ordering live in the URL.
///
/// # Example
///
/// ```ignore
/// let list = QueryFormController::from_catalog(&catalog, "listTodos", location)?
///     .config(QueryFormConfig::default().paginated())
///     .build();
///
/// list.mount().await?;
/// list.change_page(2).await?;
/// list.settle(Duration::from_secs(5)).await?;
/// let rows = list.result().await.data;
/// ```
pub struct QueryFormController<D>
where
    D: DataSource + 'static,
{
    store: QueryStore<D>,
}

impl<D> Clone for QueryFormController<D>
where
    D: DataSource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl QueryFormController<OperationSource<BoxedOperation>> {
    /// Builder for a list backed by a catalog operation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::StaleSchema`] if the catalog has no
    /// operation named `operation`.
    pub fn from_catalog(
        catalog: &ApiCatalog,
        operation: &str,
        location: Arc<dyn Location>,
    ) -> Result<QueryFormBuilder<OperationSource<BoxedOperation>>> {
        let operation = catalog.operation(operation)?;
        Ok(Self::builder(OperationSource::new(operation), location))
    }
}

impl<D> QueryFormController<D>
where
    D: DataSource + 'static,
{
    /// Start building a list over `source` and `location`.
    pub fn builder(source: D, location: Arc<dyn Location>) -> QueryFormBuilder<D> {
        QueryFormBuilder {
            source,
            location,
            config: QueryFormConfig::default(),
            filters: None,
        }
    }

    /// Read the URL and load its data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn mount(&self) -> Result<()> {
        self.send(QueryFormAction::Mount).await
    }

    /// Notify the controller that the URL changed outside of it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn location_changed(&self) -> Result<()> {
        self.send(QueryFormAction::LocationChanged).await
    }

    /// Reload the current URL's data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn refresh(&self) -> Result<()> {
        self.send(QueryFormAction::Refresh).await
    }

    /// Edit a filter. Page and ordering keys apply immediately when their
    /// mutation is enabled; other keys wait for [`Self::submit`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn change(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.send(QueryFormAction::FieldChanged {
            key: key.into(),
            value: value.into(),
        })
        .await
    }

    /// Apply a change produced by a bound filter field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn apply(&self, change: FieldChange) -> Result<()> {
        self.send(change.into()).await
    }

    /// Push the draft filters to the URL and reload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn submit(&self) -> Result<()> {
        self.send(QueryFormAction::Submit).await
    }

    /// Go to a page. Ignored unless paginated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn change_page(&self, page: impl Display) -> Result<()> {
        self.send(QueryFormAction::ChangePage {
            page: page.to_string(),
        })
        .await
    }

    /// Change the page size. Ignored unless paginated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn change_page_size(&self, page_size: impl Display) -> Result<()> {
        self.send(QueryFormAction::ChangePageSize {
            page_size: page_size.to_string(),
        })
        .await
    }

    /// Change the ordering. Ignored unless orderable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] after unmount.
    pub async fn reorder(&self, ordering: impl Into<String>) -> Result<()> {
        self.send(QueryFormAction::Reorder {
            ordering: ordering.into(),
        })
        .await
    }

    /// Stop applying results. Further commands fail.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] if already unmounted.
    pub async fn unmount(&self) -> Result<()> {
        self.send(QueryFormAction::Unmount).await?;
        self.store.close();
        Ok(())
    }

    /// Wait until every running load has finished.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::Store`] on timeout.
    pub async fn settle(&self, timeout: Duration) -> Result<()> {
        Ok(self.store.settle(timeout).await?)
    }

    /// Current list data.
    pub async fn result(&self) -> RemoteResult {
        self.store.state(|state| state.result.clone()).await
    }

    /// Parameters of the current URL.
    pub async fn values(&self) -> QueryState {
        self.store.state(|state| state.values.clone()).await
    }

    /// Filter fields bound to the draft.
    pub async fn fields(&self) -> Fields {
        self.store.state(QueryFormState::fields).await
    }

    /// Snapshot of the state.
    pub async fn state(&self) -> QueryFormState {
        self.store.state(Clone::clone).await
    }

    async fn send(&self, action: QueryFormAction) -> Result<()> {
        self.store.send(action).await?;
        Ok(())
    }
}

/// Builder for [`QueryFormController`].
pub struct QueryFormBuilder<D> {
    source: D,
    location: Arc<dyn Location>,
    config: QueryFormConfig,
    filters: Option<Arc<Schema>>,
}

impl<D> QueryFormBuilder<D>
where
    D: DataSource + 'static,
{
    /// Field names and mutation flags.
    #[must_use]
    pub fn config(mut self, config: QueryFormConfig) -> Self {
        self.config = config;
        self
    }

    /// Schema of the filter fields.
    #[must_use]
    pub fn filters(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.filters = Some(schema.into());
        self
    }

    /// Create the controller. Nothing is loaded until
    /// [`QueryFormController::mount`].
    #[must_use]
    pub fn build(self) -> QueryFormController<D> {
        let descriptors = self
            .filters
            .as_deref()
            .map(field_descriptors)
            .unwrap_or_default();
        let env = QueryFormEnvironment::new(Arc::new(self.source), self.location, self.config);

        QueryFormController {
            store: Store::new(
                QueryFormState::new(descriptors.into()),
                QueryFormReducer::new(),
                env,
            ),
        }
    }
}
