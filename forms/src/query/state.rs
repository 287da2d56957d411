//! URL query state.
//!
//! [`QueryState`] is the parsed form of a URL search string. The URL is the
//! source of truth for list queries: controllers write it through a
//! [`Location`] and read it back rather than keeping a private copy.

use crate::values::FormValues;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered string parameters of a URL query.
///
/// Keys are unique. Parsing a repeated key keeps its first position and its
/// last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryState {
    params: IndexMap<String, String>,
}

impl QueryState {
    /// Empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a search string, with or without the leading `?`.
    ///
    /// `+` decodes to a space; malformed percent escapes are kept verbatim.
    #[must_use]
    pub fn parse(search: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        match serde_urlencoded::from_str::<Vec<(String, String)>>(search) {
            Ok(pairs) => pairs.into_iter().collect(),
            Err(error) => {
                tracing::warn!(%error, search, "Unreadable query string ignored");
                Self::new()
            },
        }
    }

    /// Serialize as a search string without the leading `?`.
    ///
    /// Parsing the result yields an equal state.
    #[must_use]
    pub fn to_search(&self) -> String {
        let pairs: Vec<(&str, &str)> = self.iter().collect();
        serde_urlencoded::to_string(pairs).unwrap_or_else(|error| {
            tracing::warn!(%error, "Query state could not be encoded");
            String::new()
        })
    }

    /// Value of a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Set a parameter, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Remove a parameter.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.shift_remove(key)
    }

    /// Copy with one parameter set.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.set(key, value);
        next
    }

    /// Copy with every parameter of `other` set on top of this one.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut next = self.clone();
        for (key, value) in &other.params {
            next.set(key.clone(), value.clone());
        }
        next
    }

    /// Parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True without parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters as string form values.
    #[must_use]
    pub fn to_values(&self) -> FormValues {
        self.params
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    }

    /// Build from form values. Strings are taken as-is, `null` drops the
    /// key, and other values use their JSON text.
    #[must_use]
    pub fn from_values(values: &FormValues) -> Self {
        let params = values
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), text))
            })
            .collect();
        Self { params }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_search())
    }
}

impl<K, V> FromIterator<(K, V)> for QueryState
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (key, value) in iter {
            state.set(key, value);
        }
        state
    }
}

/// Browser-history style access to the current URL query.
///
/// `push` must be visible to the next `search` call.
pub trait Location: Send + Sync {
    /// Current search string, with or without the leading `?`.
    fn search(&self) -> String;

    /// Navigate to a new search string (without the leading `?`).
    fn push(&self, search: &str);
}
