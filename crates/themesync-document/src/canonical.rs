//! Canonical JSON
//!
//! Objects are rebuilt with lexicographically sorted keys so that the output
//! depends only on content, never on insertion order.

use serde_json::Value as JsonValue;

/// Top-level fields that do not affect rendered output
pub const VOLATILE_FIELDS: [&str; 2] = ["id", "updatedAt"];

/// Generate canonical JSON (sorted keys, no whitespace)
#[must_use]
pub fn canonical_json(value: &JsonValue) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &JsonValue, out: &mut String) {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&JsonValue::from(key.as_str()).to_string());
                out.push(':');
                if let Some(val) = map.get(key) {
                    write_canonical(val, out);
                }
            }
            out.push('}');
        }
        JsonValue::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Display on a scalar Value emits escaped JSON
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Copy of `value` without the volatile top-level fields
#[must_use]
pub fn strip_volatile(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .filter(|(k, _)| !VOLATILE_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_nested_keys() {
        let value = json!({"b": {"z": 1, "a": [true, null]}, "a": "x"});
        assert_eq!(canonical_json(&value), r#"{"a":"x","b":{"a":[true,null],"z":1}}"#);
    }

    #[test]
    fn escapes_strings_and_keys() {
        let value = json!({"q\"k": "line\nbreak"});
        assert_eq!(canonical_json(&value), r#"{"q\"k":"line\nbreak"}"#);
    }

    #[test]
    fn canonical_output_is_valid_json() {
        let value = json!({"theme": {"colors": {"primary": {"500": "#123"}}}, "n": 1.5});
        let reparsed: JsonValue = serde_json::from_str(&canonical_json(&value)).unwrap();
        assert_eq!(reparsed, value);
    }

    #[test]
    fn strips_only_top_level_volatile_fields() {
        let value = json!({"id": "1", "updatedAt": "t", "createdAt": "c", "theme": {"id": "keep"}});
        let stripped = strip_volatile(&value);
        assert_eq!(stripped, json!({"createdAt": "c", "theme": {"id": "keep"}}));
    }
}
