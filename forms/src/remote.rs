//! Remote operation abstractions.
//!
//! A remote operation is anything that takes [`SubmitParams`] and resolves
//! to a [`RemoteResponse`]: an HTTP client call in production, an in-memory
//! closure in tests. Non-2xx answers come back as responses with
//! `ok == false`; transport failures come back as [`RemoteError`].

use crate::query::QueryState;
use crate::values::FormValues;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Answer from a remote operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    /// True for 2xx statuses
    pub ok: bool,
    /// HTTP-style status code
    pub status: u16,
    /// Parsed body
    pub body: Value,
}

impl RemoteResponse {
    /// Response with the given status; `ok` follows the 2xx range.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self {
            ok: status >= 200 && status < 300,
            status,
            body,
        }
    }

    /// `200 OK` with the given body.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::new(200, body)
    }
}

/// Failure to obtain a response at all, or a failure raised by a hook.
///
/// Errors that carry a response (for example a rejected list load) expose
/// it so error mapping can read the body.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RemoteError {
    /// Human-readable description
    pub message: String,
    /// Response associated with the failure, if any
    pub response: Option<RemoteResponse>,
}

impl RemoteError {
    /// Error without a response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    /// Error wrapping a non-ok response.
    #[must_use]
    pub fn rejected(response: RemoteResponse) -> Self {
        Self {
            message: format!("Request failed with status {}", response.status),
            response: Some(response),
        }
    }
}

/// Arguments for a remote operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitParams {
    /// Path and query parameters
    #[serde(default)]
    pub params: FormValues,
    /// JSON request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
}

impl SubmitParams {
    /// Parameters that send `values` as the request body.
    #[must_use]
    pub fn with_body(values: FormValues) -> Self {
        Self {
            params: FormValues::new(),
            request_body: Some(Value::Object(values)),
        }
    }

    /// Parameters without a body.
    #[must_use]
    pub const fn with_params(params: FormValues) -> Self {
        Self {
            params,
            request_body: None,
        }
    }
}

/// State of a remote load: initial data for a form or the rows of a list.
///
/// `data` is only replaced by a successful load; it keeps the previous
/// value while reloading and after a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResult {
    /// Body of the last successful load
    pub data: Option<Value>,
    /// A load is in flight
    pub loading: bool,
    /// Failure of the last load
    pub error: Option<RemoteError>,
    /// Response of the last load, successful or not
    pub response: Option<RemoteResponse>,
}

impl Default for RemoteResult {
    fn default() -> Self {
        Self::pending()
    }
}

impl RemoteResult {
    /// Nothing loaded yet, first load in flight.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
            response: None,
        }
    }

    /// Loaded data, as if from a `200 OK` response.
    #[must_use]
    pub fn loaded(data: Value) -> Self {
        Self {
            data: Some(data.clone()),
            loading: false,
            error: None,
            response: Some(RemoteResponse::ok(data)),
        }
    }

    /// Mark a reload as started; previous data is kept.
    pub fn begin(&mut self) {
        self.loading = true;
    }

    /// Record the outcome of a load.
    pub fn complete(&mut self, outcome: Result<RemoteResponse, RemoteError>) {
        self.loading = false;
        match outcome {
            Ok(response) if response.ok => {
                self.data = Some(response.body.clone());
                self.error = None;
                self.response = Some(response);
            },
            Ok(response) => {
                self.error = Some(RemoteError::rejected(response.clone()));
                self.response = Some(response);
            },
            Err(error) => {
                self.response.clone_from(&error.response);
                self.error = Some(error);
            },
        }
    }
}

/// A named remote operation.
///
/// # Example
///
/// ```ignore
/// struct CreateTodo { client: ApiClient }
///
/// impl RemoteOperation for CreateTodo {
///     fn call(&self, params: SubmitParams)
///         -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send
///     {
///         let client = self.client.clone();
///         async move { client.post("/todos/", params.request_body).await }
///     }
/// }
/// ```
pub trait RemoteOperation: Send + Sync {
    /// Invoke the operation.
    fn call(
        &self,
        params: SubmitParams,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;
}

/// Loads list data for a query.
pub trait DataSource: Send + Sync {
    /// Fetch data for the given query parameters.
    fn fetch(
        &self,
        query: QueryState,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;
}

type OperationFn =
    dyn Fn(SubmitParams) -> BoxFuture<'static, Result<RemoteResponse, RemoteError>> + Send + Sync;

/// Type-erased [`RemoteOperation`], so operations of different types can
/// share a collection.
#[derive(Clone)]
pub struct BoxedOperation {
    call: Arc<OperationFn>,
}

impl std::fmt::Debug for BoxedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedOperation").finish_non_exhaustive()
    }
}

impl BoxedOperation {
    /// Erase a concrete operation.
    pub fn new<O>(operation: O) -> Self
    where
        O: RemoteOperation + 'static,
    {
        let operation = Arc::new(operation);
        Self::from_fn(move |params| {
            let operation = Arc::clone(&operation);
            async move { operation.call(params).await }
        })
    }

    /// Build an operation from an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(SubmitParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RemoteResponse, RemoteError>> + Send + 'static,
    {
        Self {
            call: Arc::new(move |params| Box::pin(f(params))),
        }
    }
}

impl RemoteOperation for BoxedOperation {
    fn call(
        &self,
        params: SubmitParams,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send {
        (self.call)(params)
    }
}

/// Uses a remote operation as a list data source: query parameters become
/// the operation's params and no body is sent.
#[derive(Debug, Clone)]
pub struct OperationSource<O> {
    operation: O,
}

impl<O: RemoteOperation> OperationSource<O> {
    /// Wrap an operation.
    pub const fn new(operation: O) -> Self {
        Self { operation }
    }
}

impl<O: RemoteOperation> DataSource for OperationSource<O> {
    fn fetch(
        &self,
        query: QueryState,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send {
        self.operation
            .call(SubmitParams::with_params(query.to_values()))
    }
}
