// Helpers for inspecting raw JSON values

use serde_json::{Map, Value};
use std::borrow::Cow;

/// Input mapping validated by fields and request validators.
pub type Input = Map<String, Value>;

/// Value stored under `key`, or `None` when the key is absent or maps to `null`.
pub fn present<'a>(data: &'a Input, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|value| !value.is_null())
}

/// Truthiness of a value: `null`, `false`, zero, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Whether `key` is present in `data` with a truthy value.
pub fn has_truthy(data: &Input, key: &str) -> bool {
    data.get(key).is_some_and(is_truthy)
}

/// Textual form of a value: strings as-is, everything else as JSON.
pub fn text_of(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Whether the value is a JSON integer (signed or unsigned).
pub fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_present() {
        let data = json!({"a": null, "b": "", "c": 0});
        let data = data.as_object().unwrap();

        assert_eq!(present(data, "missing"), None);
        assert_eq!(present(data, "a"), None);
        assert_eq!(present(data, "b"), Some(&json!("")));
        assert_eq!(present(data, "c"), Some(&json!(0)));
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{} should be falsy", falsy);
        }
        for truthy in [json!(true), json!(1), json!(-1), json!("a"), json!([0]), json!({"a": 1})] {
            assert!(is_truthy(&truthy), "{} should be truthy", truthy);
        }
    }

    #[test]
    fn test_text_of() {
        assert_eq!(text_of(&json!("79175002040")), "79175002040");
        assert_eq!(text_of(&json!(79175002040u64)), "79175002040");
        assert_eq!(text_of(&json!([1, 2])), "[1,2]");
    }
}
