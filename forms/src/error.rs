//! Error types for form and query controllers.

use schemaform_runtime::StoreError;
use thiserror::Error;

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

/// Failures surfaced by controllers and the API catalog.
///
/// Remote failures are not errors at this level: a rejected or thrown
/// submission becomes visible form state, and a failed list load becomes
/// the `error` of the query result.
#[derive(Debug, Error)]
pub enum FormError {
    /// The underlying store refused or timed out an action.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A schema violated its structural invariants.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// The API description no longer lists an operation or schema the
    /// client was built against. Callers should reload the description.
    #[error("API description has no `{name}`; reload it")]
    StaleSchema {
        /// Name of the missing operation or schema
        name: String,
    },
}

/// Structural problems in a schema description.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A name listed in `required` is not a property of the schema.
    #[error("required field `{0}` is not a declared property")]
    UnknownRequired(String),
}
