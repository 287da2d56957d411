//! Todo list walkthrough
//!
//! Drives the create, list and login forms against the in-memory backend
//! and prints what a view would render at each step.

use anyhow::Result;
use schemaform::mocks::MemoryLocation;
use schemaform::{
    DefaultHooks, FormController, FormError, FormLayout, Location, QueryFormConfig,
    QueryFormController, RefreshSession, RemoteResult, Session,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use todo_demo::{catalog, Backend, BackendSession};
use tracing_subscriber::EnvFilter;

const SETTLE: Duration = Duration::from_secs(5);

fn print_layout(title: &str, layout: &FormLayout) {
    println!("  [{title}]");
    if let Some(error) = &layout.form_error {
        println!("    form error: {error}");
    }
    for field in &layout.fields {
        let error = field
            .error
            .as_ref()
            .map(|error| format!("  <- {error}"))
            .unwrap_or_default();
        println!("    {:<12} = {}{error}", field.name(), field.value);
    }
    println!(
        "    ({} {})",
        layout.submit.label,
        if layout.submit.disabled { "disabled" } else { "enabled" }
    );
}

fn rows(result: &RemoteResult) -> Value {
    result
        .data
        .as_ref()
        .map(|data| data["results"].clone())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Todo forms demo ===\n");

    let backend = Arc::new(Backend::new("ann@example.com", "secret"));
    let catalog = catalog(&backend)?;

    // Create form: blank title is rejected, then fixed.
    println!("1. Create a todo");
    let create = FormController::builder(catalog.operation("createTodo")?)
        .schema(catalog.schema("Todo")?)
        .build();
    print_layout("initial", &create.layout().await);

    create.submit().await?;
    create.settle(SETTLE).await?;
    print_layout("after blank submit", &create.layout().await);

    let titles = ["Buy milk", "Walk dog", "Water plants", "Call mum", "Pay rent"];
    for title in titles {
        create.change("title", json!(title)).await?;
        create.submit().await?;
        create.settle(SETTLE).await?;
    }
    let state = create.state().await;
    println!(
        "  created {} todos, last response {:?}\n",
        titles.len(),
        state.last_response.map(|response| response.status)
    );

    // Paginated list driven by the URL.
    println!("2. List todos");
    let location = Arc::new(MemoryLocation::new(""));
    let url = Arc::clone(&location) as Arc<dyn Location>;
    let list = QueryFormController::from_catalog(&catalog, "listTodos", url)?
        .config(QueryFormConfig::default().paginated().orderable())
        .filters(catalog.schema("TodoFilter")?)
        .build();
    list.mount().await?;
    list.settle(SETTLE).await?;
    println!("  page 1: {}", rows(&list.result().await));

    list.change_page(2).await?;
    list.settle(SETTLE).await?;
    println!("  page 2: {}", rows(&list.result().await));

    list.change_page(1).await?;
    list.settle(SETTLE).await?;
    list.change("search", "milk").await?;
    list.submit().await?;
    list.settle(SETTLE).await?;
    println!("  search 'milk': {}", rows(&list.result().await));
    println!("  url history: {:?}\n", location.history());
    list.unmount().await?;

    // Login refreshes the session after a successful submit.
    println!("3. Log in");
    let session = Arc::new(BackendSession::new(Arc::clone(&backend)));
    let login = FormController::builder(catalog.operation("login")?)
        .schema(catalog.schema("Login")?)
        .hooks(RefreshSession::new(
            DefaultHooks,
            Arc::clone(&session) as Arc<dyn Session>,
        ))
        .build();

    login.change("email", json!("ann@example.com")).await?;
    login.change("password", json!("wrong")).await?;
    login.submit().await?;
    login.settle(SETTLE).await?;
    print_layout("wrong password", &login.layout().await);

    login.change("password", json!("secret")).await?;
    login.submit().await?;
    login.settle(SETTLE).await?;
    println!("  current user: {:?}\n", session.current_user());

    // Operations missing from the catalog ask for a reload.
    println!("4. Stale schema");
    match catalog.operation("deleteTodo") {
        Err(FormError::StaleSchema { name }) => {
            println!("  '{name}' is unknown, the page should reload");
        },
        Err(error) => return Err(error.into()),
        Ok(_) => println!("  'deleteTodo' unexpectedly present"),
    }

    create.unmount().await?;
    login.unmount().await?;
    println!("\n=== Demo complete ===");
    Ok(())
}
