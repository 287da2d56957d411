//! Scripted remote operation and data source.

use super::lock;
use crate::query::QueryState;
use crate::remote::{DataSource, RemoteError, RemoteOperation, RemoteResponse, SubmitParams};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Outcome = Result<RemoteResponse, RemoteError>;

#[derive(Debug)]
struct Scripted {
    delay: Option<Duration>,
    outcome: Outcome,
}

#[derive(Debug)]
struct Script<P> {
    queue: VecDeque<Scripted>,
    calls: Vec<P>,
}

impl<P> Default for Script<P> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            calls: Vec::new(),
        }
    }
}

impl<P: Clone> Script<P> {
    fn record(&mut self, params: &P) -> Option<Scripted> {
        self.calls.push(params.clone());
        self.queue.pop_front()
    }
}

async fn resolve(scripted: Scripted) -> Outcome {
    if let Some(delay) = scripted.delay {
        tokio::time::sleep(delay).await;
    }
    scripted.outcome
}

/// Remote operation that records calls and answers from a script.
///
/// Answers are consumed in order. Without a scripted answer the operation
/// returns `200 OK` echoing the request body (or the params without one).
/// Clones share the script.
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    script: Arc<Mutex<Script<SubmitParams>>>,
}

impl MockRemote {
    /// Mock with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next unscripted call with `response`.
    pub fn respond_with(&self, response: RemoteResponse) {
        self.push(None, Ok(response));
    }

    /// Answer the next unscripted call with `response` after `delay`.
    pub fn respond_after(&self, delay: Duration, response: RemoteResponse) {
        self.push(Some(delay), Ok(response));
    }

    /// Fail the next unscripted call with `error`.
    pub fn fail_with(&self, error: RemoteError) {
        self.push(None, Err(error));
    }

    /// Parameters of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<SubmitParams> {
        lock(&self.script).calls.clone()
    }

    fn push(&self, delay: Option<Duration>, outcome: Outcome) {
        lock(&self.script).queue.push_back(Scripted { delay, outcome });
    }
}

impl RemoteOperation for MockRemote {
    fn call(&self, params: SubmitParams) -> impl Future<Output = Outcome> + Send {
        let scripted = lock(&self.script).record(&params).unwrap_or_else(|| {
            let body = params
                .request_body
                .clone()
                .unwrap_or_else(|| Value::Object(params.params.clone()));
            Scripted {
                delay: None,
                outcome: Ok(RemoteResponse::ok(body)),
            }
        });
        resolve(scripted)
    }
}

/// Data source that records requested queries and answers from a script.
///
/// Without a scripted answer it returns an empty page. Clones share the
/// script.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    script: Arc<Mutex<Script<QueryState>>>,
}

impl MockDataSource {
    /// Mock with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next unscripted request with `response`.
    pub fn respond_with(&self, response: RemoteResponse) {
        self.push(None, Ok(response));
    }

    /// Answer the next unscripted request with `response` after `delay`.
    pub fn respond_after(&self, delay: Duration, response: RemoteResponse) {
        self.push(Some(delay), Ok(response));
    }

    /// Fail the next unscripted request with `error`.
    pub fn fail_with(&self, error: RemoteError) {
        self.push(None, Err(error));
    }

    /// Every query requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<QueryState> {
        lock(&self.script).calls.clone()
    }

    fn push(&self, delay: Option<Duration>, outcome: Outcome) {
        lock(&self.script).queue.push_back(Scripted { delay, outcome });
    }
}

impl DataSource for MockDataSource {
    fn fetch(&self, query: QueryState) -> impl Future<Output = Outcome> + Send {
        let scripted = lock(&self.script).record(&query).unwrap_or_else(|| Scripted {
            delay: None,
            outcome: Ok(RemoteResponse::ok(json!({"count": 0, "results": []}))),
        });
        resolve(scripted)
    }
}
