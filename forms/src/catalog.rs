//! Named operations and schemas of a backend API.
//!
//! The catalog is built from the backend's API description. Looking up a
//! name the description does not contain means the client was built against
//! an older description; that is reported as [`FormError::StaleSchema`] so
//! the caller can reload instead of rendering a broken form.

use crate::error::{FormError, Result};
use crate::remote::{BoxedOperation, RemoteOperation};
use crate::schema::{PropertyDescriptor, Schema};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of remote operations and object schemas by name.
#[derive(Debug, Clone, Default)]
pub struct ApiCatalog {
    operations: HashMap<String, BoxedOperation>,
    schemas: HashMap<String, Arc<Schema>>,
}

impl ApiCatalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every schema under `components.schemas` of an OpenAPI
    /// document. Schemas without properties, or with properties that do not
    /// parse, are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Schema`] if a schema lists an undeclared
    /// required property.
    pub fn from_openapi(document: &Value) -> Result<Self> {
        let mut catalog = Self::new();
        let Some(schemas) = document
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        else {
            tracing::warn!("API description has no components.schemas");
            return Ok(catalog);
        };

        for (name, raw) in schemas {
            let Some(properties) = raw.get("properties") else {
                tracing::trace!(schema = %name, "Skipping schema without properties");
                continue;
            };
            let properties: IndexMap<String, PropertyDescriptor> =
                match serde_json::from_value(properties.clone()) {
                    Ok(properties) => properties,
                    Err(error) => {
                        tracing::warn!(schema = %name, error = %error, "Skipping unreadable schema");
                        continue;
                    },
                };
            let required: Vec<String> = raw
                .get("required")
                .and_then(|required| serde_json::from_value(required.clone()).ok())
                .unwrap_or_default();

            let schema = Schema::new(properties, required)?;
            catalog.schemas.insert(name.clone(), Arc::new(schema));
        }

        tracing::debug!(schemas = catalog.schemas.len(), "Loaded API description");
        Ok(catalog)
    }

    /// Register an operation.
    #[must_use]
    pub fn with_operation<O>(mut self, name: impl Into<String>, operation: O) -> Self
    where
        O: RemoteOperation + 'static,
    {
        self.operations
            .insert(name.into(), BoxedOperation::new(operation));
        self
    }

    /// Register a schema.
    #[must_use]
    pub fn with_schema(mut self, name: impl Into<String>, schema: impl Into<Arc<Schema>>) -> Self {
        self.schemas.insert(name.into(), schema.into());
        self
    }

    /// Operation by name.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::StaleSchema`] if the operation is unknown.
    pub fn operation(&self, name: &str) -> Result<BoxedOperation> {
        self.operations.get(name).cloned().ok_or_else(|| stale(name))
    }

    /// Schema by name.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::StaleSchema`] if the schema is unknown.
    pub fn schema(&self, name: &str) -> Result<Arc<Schema>> {
        self.schemas.get(name).cloned().ok_or_else(|| stale(name))
    }

    /// Whether an operation is registered.
    #[must_use]
    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }
}

fn stale(name: &str) -> FormError {
    tracing::warn!(name, "API description is stale");
    FormError::StaleSchema {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use crate::error::SchemaError;
    use crate::mocks::MockRemote;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "openapi": "3.0.2",
            "components": {
                "schemas": {
                    "Todo": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "readOnly": true},
                            "title": {"type": "string", "maxLength": 200}
                        },
                        "required": ["title"]
                    },
                    "Status": {"type": "string", "enum": ["a", "b"]}
                }
            }
        })
    }

    #[test]
    fn loads_object_schemas() {
        let catalog = ApiCatalog::from_openapi(&document()).unwrap();

        let todo = catalog.schema("Todo").unwrap();
        assert!(todo.is_required("title"));
        assert!(matches!(
            catalog.schema("Status"),
            Err(FormError::StaleSchema { name }) if name == "Status"
        ));
    }

    #[test]
    fn missing_operation_is_stale() {
        let catalog = ApiCatalog::new().with_operation("createTodo", MockRemote::new());

        assert!(catalog.has_operation("createTodo"));
        assert!(catalog.operation("createTodo").is_ok());
        assert!(matches!(
            catalog.operation("listTodos"),
            Err(FormError::StaleSchema { name }) if name == "listTodos"
        ));
    }

    #[test]
    fn undeclared_required_property_is_an_error() {
        let document = json!({
            "components": {"schemas": {"Broken": {
                "properties": {"title": {"type": "string"}},
                "required": ["owner"]
            }}}
        });

        assert!(matches!(
            ApiCatalog::from_openapi(&document),
            Err(FormError::Schema(SchemaError::UnknownRequired(name))) if name == "owner"
        ));
    }

    #[test]
    fn document_without_schemas_is_empty() {
        let catalog = ApiCatalog::from_openapi(&json!({"openapi": "3.0.2"})).unwrap();
        assert!(catalog.schema("Todo").is_err());
    }
}
