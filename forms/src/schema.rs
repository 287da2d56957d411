//! Object schema descriptions.
//!
//! A [`Schema`] is the subset of an OpenAPI object schema that drives form
//! rendering: an ordered map of properties plus the list of required names.
//! Property order is preserved from the source document and determines the
//! order in which fields are rendered.

use crate::error::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// `true` / `false`
    Boolean,
    /// Whole numbers
    Integer,
    /// Any number
    Number,
    /// Text, dates and other string formats
    String,
    /// Arrays, objects and anything newer; rendered as text
    #[serde(other)]
    Other,
}

/// Description of a single property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// JSON type
    #[serde(rename = "type")]
    pub kind: PropertyType,

    /// String format hint (`password`, `date`, `date-time`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Allowed values; the field renders as a choice when present
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,

    /// Declared default; `Some(Value::Null)` for an explicit `null`
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,

    /// Whether `null` is an acceptable value
    #[serde(default)]
    pub nullable: bool,

    /// Server-managed field; rendered disabled
    #[serde(default)]
    pub read_only: bool,

    /// Example value, shown as the placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Keeps an explicit `null` distinguishable from an absent key.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PropertyDescriptor {
    /// Descriptor of the given type with every optional attribute unset.
    #[must_use]
    pub const fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            format: None,
            options: None,
            default: None,
            nullable: false,
            read_only: false,
            example: None,
        }
    }

    /// Set the string format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the allowed values.
    #[must_use]
    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark as read-only.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set the example value.
    #[must_use]
    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    /// True when `format` equals the given name.
    #[must_use]
    pub fn has_format(&self, format: &str) -> bool {
        self.format.as_deref() == Some(format)
    }
}

#[derive(Deserialize)]
struct RawSchema {
    #[serde(default)]
    properties: IndexMap<String, PropertyDescriptor>,
    #[serde(default)]
    required: Vec<String>,
}

/// Object schema: ordered properties and required names.
///
/// Every name in `required` is guaranteed to be a declared property.
///
/// # Example
///
/// ```
/// use schemaform::schema::Schema;
///
/// let schema: Schema = serde_json::from_value(serde_json::json!({
///     "properties": {
///         "title": {"type": "string"},
///         "done": {"type": "boolean"}
///     },
///     "required": ["title"]
/// })).unwrap();
///
/// assert!(schema.is_required("title"));
/// assert_eq!(schema.property_names().collect::<Vec<_>>(), ["title", "done"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct Schema {
    properties: IndexMap<String, PropertyDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    required: Vec<String>,
}

impl TryFrom<RawSchema> for Schema {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> std::result::Result<Self, Self::Error> {
        Self::new(raw.properties, raw.required)
    }
}

impl Schema {
    /// Build a schema, checking that every required name is declared.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownRequired`] for the first required name
    /// without a matching property.
    pub fn new(
        properties: IndexMap<String, PropertyDescriptor>,
        required: Vec<String>,
    ) -> std::result::Result<Self, SchemaError> {
        if let Some(unknown) = required.iter().find(|name| !properties.contains_key(*name)) {
            return Err(SchemaError::UnknownRequired(unknown.clone()));
        }
        Ok(Self {
            properties,
            required,
        })
    }

    /// Start an empty schema for incremental construction.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.properties.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    /// Property names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Look up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Whether the named property is required.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True when the schema declares no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Incremental [`Schema`] construction, validated on [`SchemaBuilder::build`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    properties: IndexMap<String, PropertyDescriptor>,
    required: Vec<String>,
}

impl SchemaBuilder {
    /// Append an optional property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        self.properties.insert(name.into(), descriptor);
        self
    }

    /// Append a required property.
    #[must_use]
    pub fn required(mut self, name: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, descriptor);
        self
    }

    /// Finish the schema.
    ///
    /// # Errors
    ///
    /// Cannot fail for schemas assembled with this builder alone, but shares
    /// the validation of [`Schema::new`].
    pub fn build(self) -> std::result::Result<Schema, SchemaError> {
        Schema::new(self.properties, self.required)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_null_default_is_kept() {
        let prop: PropertyDescriptor =
            serde_json::from_value(json!({"type": "string", "default": null})).unwrap();
        assert_eq!(prop.default, Some(Value::Null));

        let prop: PropertyDescriptor = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert_eq!(prop.default, None);
    }

    #[test]
    fn read_only_and_unknown_types_parse() {
        let prop: PropertyDescriptor =
            serde_json::from_value(json!({"type": "array", "readOnly": true})).unwrap();
        assert_eq!(prop.kind, PropertyType::Other);
        assert!(prop.read_only);
    }

    #[test]
    fn unknown_required_name_is_rejected() {
        let result: std::result::Result<Schema, _> = serde_json::from_value(json!({
            "properties": {"title": {"type": "string"}},
            "required": ["owner"]
        }));
        assert!(result.is_err());

        let built = Schema::new(IndexMap::new(), vec!["owner".into()]);
        assert_eq!(built, Err(SchemaError::UnknownRequired("owner".into())));
    }

    #[test]
    fn declaration_order_is_preserved() {
        let schema: Schema = serde_json::from_value(json!({
            "properties": {
                "zeta": {"type": "string"},
                "alpha": {"type": "integer"},
                "mid": {"type": "boolean"}
            }
        }))
        .unwrap();

        assert_eq!(schema.property_names().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn builder_marks_required() {
        let schema = Schema::builder()
            .required("title", PropertyDescriptor::new(PropertyType::String))
            .property("done", PropertyDescriptor::new(PropertyType::Boolean))
            .build()
            .unwrap();

        assert!(schema.is_required("title"));
        assert!(!schema.is_required("done"));
        assert_eq!(schema.len(), 2);
    }
}
