//! Schema-driven forms.
//!
//! A form is derived from a [`Schema`](crate::schema::Schema): initial
//! values and field descriptors come from introspection, and submission
//! runs through [`SubmissionHooks`](crate::pipeline::SubmissionHooks)
//! against a [`RemoteOperation`](crate::remote::RemoteOperation).

mod actions;
mod controller;
mod environment;
mod reducer;
mod state;

pub use actions::FormAction;
pub use controller::{FormBuilder, FormController};
pub use environment::FormEnvironment;
pub use reducer::FormReducer;
pub use state::FormState;
