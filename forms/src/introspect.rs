//! Schema introspection: initial values and field descriptors.
//!
//! Pure functions over a [`Schema`]; the only input besides the schema is
//! the clock used for date defaults.

use crate::schema::{PropertyDescriptor, PropertyType, Schema};
use crate::values::FormValues;
use schemaform_core::environment::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format of `date` defaults (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of `date-time` defaults (ISO-8601 with local offset, no fraction).
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Input control for a non-choice field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Boolean toggle
    Checkbox,
    /// Numeric entry
    Number,
    /// Masked text entry
    Password,
    /// Free text
    Text,
}

/// How a field is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    /// Selection among the property's allowed values, in declared order
    Enum {
        /// Allowed values
        options: Vec<Value>,
    },
    /// Single input control
    Scalar {
        /// Control type
        input: InputKind,
    },
}

/// Presentation metadata derived from one schema property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Property name
    pub name: String,
    /// Rendering kind
    pub kind: FieldKind,
    /// Listed in the schema's `required`
    pub required: bool,
    /// Property is read-only
    pub disabled: bool,
    /// The property example, else the field name
    pub placeholder: String,
}

/// Default value for a single property.
///
/// Rules apply in order: declared default, `null` for nullable, `false`
/// for booleans, `0` for numbers, today's local date for `date`, the
/// current local date-time for `date-time`, otherwise the empty string.
#[must_use]
pub fn default_value(property: &PropertyDescriptor, clock: &dyn Clock) -> Value {
    if let Some(default) = &property.default {
        return default.clone();
    }
    if property.nullable {
        return Value::Null;
    }
    match property.kind {
        PropertyType::Boolean => return Value::Bool(false),
        PropertyType::Integer | PropertyType::Number => return Value::from(0),
        PropertyType::String | PropertyType::Other => {},
    }
    if property.has_format("date") {
        return Value::String(clock.local_now().format(DATE_FORMAT).to_string());
    }
    if property.has_format("date-time") {
        return Value::String(clock.local_now().format(DATE_TIME_FORMAT).to_string());
    }
    Value::String(String::new())
}

/// Initial values for every property, in schema order.
///
/// The result has exactly the schema's property names as keys.
#[must_use]
pub fn initial_values(schema: &Schema, clock: &dyn Clock) -> FormValues {
    schema
        .properties()
        .map(|(name, property)| (name.to_string(), default_value(property, clock)))
        .collect()
}

/// Rendering kind of a property.
///
/// Allowed values win over the type; then booleans are checkboxes, numbers
/// are numeric inputs, `password` strings are masked, and everything else
/// is text.
#[must_use]
pub fn input_kind_for(property: &PropertyDescriptor) -> FieldKind {
    if let Some(options) = &property.options {
        return FieldKind::Enum {
            options: options.clone(),
        };
    }
    let input = match property.kind {
        PropertyType::Boolean => InputKind::Checkbox,
        PropertyType::Integer | PropertyType::Number => InputKind::Number,
        PropertyType::String if property.has_format("password") => InputKind::Password,
        PropertyType::String | PropertyType::Other => InputKind::Text,
    };
    FieldKind::Scalar { input }
}

/// Descriptor for one named property.
#[must_use]
pub fn describe(schema: &Schema, name: &str, property: &PropertyDescriptor) -> FieldDescriptor {
    let placeholder = match &property.example {
        Some(Value::String(example)) => example.clone(),
        Some(example) => example.to_string(),
        None => name.to_string(),
    };

    FieldDescriptor {
        name: name.to_string(),
        kind: input_kind_for(property),
        required: schema.is_required(name),
        disabled: property.read_only,
        placeholder,
    }
}

/// Descriptors for every property, in schema order.
#[must_use]
pub fn field_descriptors(schema: &Schema) -> Vec<FieldDescriptor> {
    schema
        .properties()
        .map(|(name, property)| describe(schema, name, property))
        .collect()
}
