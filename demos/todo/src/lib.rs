//! In-memory todo backend for the demo.
//!
//! Mirrors a small Django REST Framework API: a paginated, searchable todo
//! list, todo creation with field validation, and session login.

use schemaform::{
    ApiCatalog, BoxedOperation, FormValues, RemoteResponse, Result, Session, SubmitParams,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Largest page the list endpoint returns.
pub const MAX_PAGE_SIZE: usize = 3;

/// API description served by the backend.
#[must_use]
pub fn api_document() -> Value {
    json!({
        "openapi": "3.0.2",
        "info": {"title": "My Todo List", "version": "1.0.0"},
        "components": {
            "schemas": {
                "Todo": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "integer", "readOnly": true},
                        "title": {"type": "string", "example": "Buy milk"},
                        "description": {"type": "string", "nullable": true},
                        "due_date": {"type": "string", "format": "date"},
                        "priority": {"type": "string", "enum": ["low", "normal", "high"], "default": "normal"},
                        "completed": {"type": "boolean"}
                    },
                    "required": ["title"]
                },
                "Login": {
                    "type": "object",
                    "properties": {
                        "email": {"type": "string"},
                        "password": {"type": "string", "format": "password"}
                    },
                    "required": ["email", "password"]
                },
                "TodoFilter": {
                    "type": "object",
                    "properties": {
                        "search": {"type": "string"}
                    }
                }
            }
        }
    })
}

#[derive(Debug)]
struct Account {
    email: String,
    password: String,
}

/// Todos, accounts and the logged-in user.
#[derive(Debug)]
pub struct Backend {
    todos: Mutex<Vec<Value>>,
    next_id: AtomicU64,
    accounts: Vec<Account>,
    current_user: Mutex<Option<Value>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn text<'a>(values: &'a FormValues, key: &str) -> &'a str {
    values.get(key).and_then(Value::as_str).unwrap_or_default()
}

impl Backend {
    /// Backend with one account and no todos.
    #[must_use]
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            todos: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            accounts: vec![Account {
                email: email.to_string(),
                password: password.to_string(),
            }],
            current_user: Mutex::new(None),
        }
    }

    /// `POST /todos/`
    pub fn create_todo(&self, params: &SubmitParams) -> RemoteResponse {
        let body = params
            .request_body
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        if text(&body, "title").trim().is_empty() {
            return RemoteResponse::new(400, json!({"title": ["This field may not be blank."]}));
        }

        let mut todo = body;
        todo.insert("id".into(), json!(self.next_id.fetch_add(1, Ordering::SeqCst)));
        let todo = Value::Object(todo);
        lock(&self.todos).push(todo.clone());

        tracing::info!(title = %todo["title"], "Todo created");
        RemoteResponse::new(201, todo)
    }

    /// `GET /todos/?search=&ordering=&page=&page_size=`
    pub fn list_todos(&self, params: &SubmitParams) -> RemoteResponse {
        let query = &params.params;
        let search = text(query, "search").to_lowercase();
        let page: usize = text(query, "page").parse().unwrap_or(1).max(1);
        let page_size: usize = text(query, "page_size")
            .parse()
            .unwrap_or(MAX_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let mut todos: Vec<Value> = lock(&self.todos)
            .iter()
            .filter(|todo| {
                todo["title"]
                    .as_str()
                    .is_some_and(|title| title.to_lowercase().contains(&search))
            })
            .cloned()
            .collect();

        match text(query, "ordering") {
            "title" => todos.sort_by(|a, b| a["title"].as_str().cmp(&b["title"].as_str())),
            "-title" => todos.sort_by(|a, b| b["title"].as_str().cmp(&a["title"].as_str())),
            _ => {},
        }

        let count = todos.len();
        let start = (page - 1) * page_size;
        if start >= count && page > 1 {
            return RemoteResponse::new(404, json!({"detail": "Invalid page."}));
        }
        let results: Vec<Value> = todos.into_iter().skip(start).take(page_size).collect();

        RemoteResponse::ok(json!({
            "count": count,
            "next": (start + page_size < count).then(|| page + 1),
            "previous": (page > 1).then(|| page - 1),
            "results": results,
        }))
    }

    /// `POST /login/`
    pub fn login(&self, params: &SubmitParams) -> RemoteResponse {
        let body = params
            .request_body
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let email = text(&body, "email");
        let password = text(&body, "password");

        let known = self
            .accounts
            .iter()
            .any(|account| account.email == email && account.password == password);
        if !known {
            return RemoteResponse::new(
                401,
                json!({"non_field_errors": ["Unable to log in with provided credentials."]}),
            );
        }

        let user = json!({"email": email, "is_active": true});
        *lock(&self.current_user) = Some(user.clone());
        RemoteResponse::ok(user)
    }

    /// `GET /current-user/`
    #[must_use]
    pub fn current_user(&self) -> Option<Value> {
        lock(&self.current_user).clone()
    }
}

/// Session that reads the backend's logged-in user.
#[derive(Debug, Clone)]
pub struct BackendSession {
    backend: Arc<Backend>,
    user: Arc<Mutex<Option<Value>>>,
}

impl BackendSession {
    /// Session over `backend`, initially logged out.
    #[must_use]
    pub fn new(backend: Arc<Backend>) -> Self {
        Self {
            backend,
            user: Arc::new(Mutex::new(None)),
        }
    }
}

impl Session for BackendSession {
    fn current_user(&self) -> Option<Value> {
        lock(&self.user).clone()
    }

    fn refresh(&self) {
        let user = self.backend.current_user();
        tracing::debug!(logged_in = user.is_some(), "Session refreshed");
        *lock(&self.user) = user;
    }
}

fn operation(
    backend: &Arc<Backend>,
    handler: fn(&Backend, &SubmitParams) -> RemoteResponse,
) -> BoxedOperation {
    let backend = Arc::clone(backend);
    BoxedOperation::from_fn(move |params: SubmitParams| {
        let backend = Arc::clone(&backend);
        async move { Ok(handler(&backend, &params)) }
    })
}

/// Catalog of the backend's schemas and operations.
///
/// # Errors
///
/// Returns an error if the API description holds an invalid schema.
pub fn catalog(backend: &Arc<Backend>) -> Result<ApiCatalog> {
    Ok(ApiCatalog::from_openapi(&api_document())?
        .with_operation("createTodo", operation(backend, Backend::create_todo))
        .with_operation("listTodos", operation(backend, Backend::list_todos))
        .with_operation("login", operation(backend, Backend::login)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: Value) -> SubmitParams {
        let Value::Object(values) = value else {
            unreachable!()
        };
        SubmitParams::with_body(values)
    }

    fn query(value: Value) -> SubmitParams {
        let Value::Object(values) = value else {
            unreachable!()
        };
        SubmitParams::with_params(values)
    }

    #[test]
    fn blank_title_is_rejected() {
        let backend = Backend::new("ann@example.com", "pw");
        let response = backend.create_todo(&body(json!({"title": " "})));
        assert_eq!(response.status, 400);
        assert_eq!(response.body["title"][0], "This field may not be blank.");
    }

    #[test]
    fn list_paginates_and_searches() {
        let backend = Backend::new("ann@example.com", "pw");
        for title in ["milk", "eggs", "bread", "more milk"] {
            backend.create_todo(&body(json!({"title": title})));
        }

        let first = backend.list_todos(&query(json!({})));
        assert_eq!(first.body["count"], 4);
        assert_eq!(first.body["results"].as_array().map(Vec::len), Some(3));
        assert_eq!(first.body["next"], 2);

        let second = backend.list_todos(&query(json!({"page": "2"})));
        assert_eq!(second.body["results"][0]["title"], "more milk");

        let milk = backend.list_todos(&query(json!({"search": "MILK", "ordering": "-title"})));
        assert_eq!(milk.body["count"], 2);
        assert_eq!(milk.body["results"][0]["title"], "more milk");

        assert_eq!(backend.list_todos(&query(json!({"page": "9"}))).status, 404);
    }

    #[test]
    fn login_sets_current_user() {
        let backend = Arc::new(Backend::new("ann@example.com", "pw"));
        let session = BackendSession::new(Arc::clone(&backend));

        assert_eq!(backend.login(&body(json!({"email": "ann@example.com", "password": "no"}))).status, 401);
        assert!(backend.login(&body(json!({"email": "ann@example.com", "password": "pw"}))).ok);

        assert!(session.current_user().is_none());
        session.refresh();
        assert_eq!(session.current_user().unwrap_or_default()["email"], "ann@example.com");
    }
}
