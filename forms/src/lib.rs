//! # Schemaform
//!
//! Schema-driven forms and URL-synchronized list queries.
//!
//! Given an object schema from a backend's API description, this crate
//! derives a form's initial values and field descriptors, binds them to a
//! form state machine, and runs submissions through overridable hooks. List
//! views keep their filters, page and ordering in the URL and reload when
//! the URL changes.
//!
//! ## Architecture
//!
//! Both controllers are stores over a reducer:
//!
//! ```text
//! Command → Reducer → (State, Effects) → Remote call → Completion → Reducer
//! ```
//!
//! Every capability (remote operation, clock, URL, leave guard, session) is
//! injected, and [`mocks`] provides in-memory versions of each.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaform::{ApiCatalog, FormController, RefreshSession};
//!
//! let catalog = ApiCatalog::from_openapi(&document)?
//!     .with_operation("login", login_operation);
//!
//! let form = FormController::builder(catalog.operation("login")?)
//!     .schema(catalog.schema("Login")?)
//!     .hooks(RefreshSession::new(DefaultHooks, session))
//!     .build();
//!
//! form.change("username", json!("ann")).await?;
//! form.submit().await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod binder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod guard;
pub mod introspect;
pub mod mocks;
pub mod pipeline;
pub mod query;
pub mod remote;
pub mod schema;
pub mod session;
pub mod values;

// Re-export main types for convenience
pub use binder::{BoundField, FieldChange, FieldValidator, Fields, FormLayout, Required, Validators};
pub use catalog::ApiCatalog;
pub use config::{FormConfig, PromptPolicy, QueryFormConfig};
pub use error::{FormError, Result, SchemaError};
pub use form::{FormAction, FormController, FormState};
pub use guard::LeaveGuard;
pub use introspect::{field_descriptors, initial_values, FieldDescriptor, FieldKind, InputKind};
pub use pipeline::{DefaultHooks, ErrorMessage, SubmissionErrors, SubmissionHooks, SubmitFailure};
pub use query::{Location, QueryFormController, QueryState};
pub use remote::{
    BoxedOperation, DataSource, OperationSource, RemoteError, RemoteOperation, RemoteResponse,
    RemoteResult, SubmitParams,
};
pub use schema::{PropertyDescriptor, PropertyType, Schema};
pub use session::{RefreshSession, Session};
pub use values::FormValues;
