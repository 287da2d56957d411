//! URL-synchronized list queries.
//!
//! A query form keeps its filters, page and ordering in the URL and loads
//! list data for whatever the URL currently says.

mod controller;
mod form;
mod state;

pub use controller::{QueryFormBuilder, QueryFormController};
pub use form::{QueryFormAction, QueryFormEnvironment, QueryFormReducer, QueryFormState, RequestKey};
pub use state::{Location, QueryState};
