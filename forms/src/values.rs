//! Form value maps.

use serde_json::{Map, Value};

/// Field name to value mapping, in schema property order.
pub type FormValues = Map<String, Value>;

/// Shallow merge: every key of `overrides` replaces the key in `base`.
///
/// Keys already in `base` keep their position.
#[must_use]
pub fn merge(mut base: FormValues, overrides: &FormValues) -> FormValues {
    for (name, value) in overrides {
        base.insert(name.clone(), value.clone());
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overrides_win_and_order_is_kept() {
        let Value::Object(base) = json!({"title": "", "done": false}) else {
            unreachable!()
        };
        let Value::Object(overrides) = json!({"done": true, "extra": 1}) else {
            unreachable!()
        };

        let merged = merge(base, &overrides);
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["title", "done", "extra"]);
        assert_eq!(merged["done"], json!(true));
    }
}
