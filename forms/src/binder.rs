//! Field binding.
//!
//! Binds field descriptors to the current values and errors of a form so a
//! view can render each field with its control, value and message.

use crate::introspect::FieldDescriptor;
use crate::pipeline::ErrorMessage;
use crate::schema::Schema;
use crate::values::FormValues;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// A requested change of one field's value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Field name
    pub name: String,
    /// New value
    pub value: Value,
}

/// A field ready to render: descriptor, current value and error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundField {
    /// Presentation metadata
    #[serde(flatten)]
    pub descriptor: FieldDescriptor,
    /// Current value; `null` when the form has none
    pub value: Value,
    /// Error to show next to the field
    pub error: Option<ErrorMessage>,
}

impl BoundField {
    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Change request for this field, to be sent to its controller.
    #[must_use]
    pub fn change(&self, value: Value) -> FieldChange {
        FieldChange {
            name: self.descriptor.name.clone(),
            value,
        }
    }
}

/// All bound fields of a form, in schema order.
///
/// Only schema properties become fields. Values without a property stay in
/// the form values for hand-built layouts to read by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fields {
    fields: Vec<BoundField>,
}

impl Fields {
    /// Bind descriptors to values and per-field errors.
    #[must_use]
    pub fn bind(
        descriptors: &[FieldDescriptor],
        values: &FormValues,
        errors: &BTreeMap<String, ErrorMessage>,
    ) -> Self {
        let fields = descriptors
            .iter()
            .map(|descriptor| BoundField {
                value: values.get(&descriptor.name).cloned().unwrap_or(Value::Null),
                error: errors.get(&descriptor.name).cloned(),
                descriptor: descriptor.clone(),
            })
            .collect();

        Self { fields }
    }

    /// Field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoundField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Every field in order.
    #[must_use]
    pub fn all(&self) -> &[BoundField] {
        &self.fields
    }

    /// Iterate fields in order.
    pub fn iter(&self) -> std::slice::Iter<'_, BoundField> {
        self.fields.iter()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True without fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for Fields {
    type Item = BoundField;
    type IntoIter = std::vec::IntoIter<BoundField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a BoundField;
    type IntoIter = std::slice::Iter<'a, BoundField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Submit button state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    /// Button text
    pub label: String,
    /// Submitting or initial data still loading
    pub disabled: bool,
}

/// Default rendering of a whole form: form-level error, every field, then
/// the submit control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormLayout {
    /// Error not tied to a field
    pub form_error: Option<ErrorMessage>,
    /// Fields in schema order
    pub fields: Fields,
    /// Submit button
    pub submit: SubmitControl,
}

/// Client-side check of one field.
pub trait FieldValidator: Send + Sync {
    /// Error for `value`, given every current value of the form.
    fn validate(&self, value: &Value, values: &FormValues) -> Option<ErrorMessage>;
}

/// Rejects `null`, missing and blank-string values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

/// Message of [`Required`].
pub const REQUIRED_MESSAGE: &str = "This field is required.";

impl FieldValidator for Required {
    fn validate(&self, value: &Value, _values: &FormValues) -> Option<ErrorMessage> {
        let missing = match value {
            Value::Null => true,
            Value::String(text) => text.trim().is_empty(),
            _ => false,
        };
        missing.then(|| ErrorMessage::text(REQUIRED_MESSAGE))
    }
}

/// Validators per field. Empty by default: forms validate nothing unless
/// validators are registered.
#[derive(Clone, Default)]
pub struct Validators {
    by_field: HashMap<String, Vec<Arc<dyn FieldValidator>>>,
}

impl fmt::Debug for Validators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validators")
            .field("fields", &self.by_field.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Validators {
    /// No validators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// [`Required`] for every required property of `schema`.
    #[must_use]
    pub fn required_from(schema: &Schema) -> Self {
        schema
            .property_names()
            .filter(|name| schema.is_required(name))
            .fold(Self::new(), |validators, name| validators.with(name, Required))
    }

    /// Add a validator for a field.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, validator: impl FieldValidator + 'static) -> Self {
        self.by_field
            .entry(name.into())
            .or_default()
            .push(Arc::new(validator));
        self
    }

    /// True when no validator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    /// First error for one field.
    #[must_use]
    pub fn validate_field(&self, name: &str, values: &FormValues) -> Option<ErrorMessage> {
        let validators = self.by_field.get(name)?;
        let value = values.get(name).unwrap_or(&Value::Null);
        validators
            .iter()
            .find_map(|validator| validator.validate(value, values))
    }

    /// First error of every failing field.
    #[must_use]
    pub fn validate_all(&self, values: &FormValues) -> BTreeMap<String, ErrorMessage> {
        self.by_field
            .keys()
            .filter_map(|name| {
                self.validate_field(name, values)
                    .map(|error| (name.clone(), error))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use crate::introspect::field_descriptors;
    use serde_json::json;

    fn values(value: Value) -> FormValues {
        let Value::Object(map) = value else {
            unreachable!("test values are objects")
        };
        map
    }

    fn schema() -> Schema {
        serde_json::from_value(json!({
            "properties": {
                "title": {"type": "string"},
                "done": {"type": "boolean"}
            },
            "required": ["title"]
        }))
        .unwrap()
    }

    #[test]
    fn bind_attaches_values_and_errors() {
        let mut errors = BTreeMap::new();
        errors.insert("title".to_string(), ErrorMessage::text("too short"));

        let fields = Fields::bind(
            &field_descriptors(&schema()),
            &values(json!({"title": "a", "done": true})),
            &errors,
        );

        let title = fields.get("title").unwrap();
        assert_eq!(title.value, json!("a"));
        assert_eq!(title.error, Some(ErrorMessage::text("too short")));
        assert!(title.descriptor.required);
        assert_eq!(fields.get("done").unwrap().error, None);
        assert!(fields.get("missing").is_none());
    }

    #[test]
    fn only_schema_properties_are_bound() {
        let fields = Fields::bind(
            &field_descriptors(&schema()),
            &values(json!({"owner": "ann", "done": false, "title": ""})),
            &BTreeMap::new(),
        );

        let names: Vec<_> = fields.iter().map(BoundField::name).collect();
        assert_eq!(names, ["title", "done"]);
        assert!(fields.get("owner").is_none());
    }

    #[test]
    fn no_descriptors_bind_nothing() {
        let fields = Fields::bind(&[], &values(json!({"title": "a", "note": "b"})), &BTreeMap::new());
        assert!(fields.is_empty());
    }

    #[test]
    fn change_names_the_field() {
        let fields = Fields::bind(&field_descriptors(&schema()), &FormValues::new(), &BTreeMap::new());
        let change = fields.get("done").unwrap().change(json!(true));
        assert_eq!(change.name, "done");
        assert_eq!(fields.get("done").unwrap().value, Value::Null);
    }

    #[test]
    fn required_validator() {
        let validators = Validators::required_from(&schema());

        assert!(validators.validate_field("title", &values(json!({"title": "  "}))).is_some());
        assert!(validators.validate_field("title", &values(json!({}))).is_some());
        assert!(validators.validate_field("title", &values(json!({"title": "x"}))).is_none());
        assert!(validators.validate_field("done", &values(json!({}))).is_none());

        let all = validators.validate_all(&values(json!({"title": ""})));
        assert_eq!(all.len(), 1);
        assert_eq!(all["title"].messages(), ["This field is required."]);
    }
}
