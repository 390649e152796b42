//! Reduce a chat backend reply of unknown shape to one display string.
//!
//! The backend wraps its answer inconsistently: sometimes a bare string,
//! sometimes an object under one of several keys, sometimes an object that
//! was serialized into a string and wrapped again. [`normalize`] peels those
//! layers until it reaches text.

use serde_json::{Map, Value};

/// Maximum number of layers unwrapped before the remaining value is
/// rendered as-is.
pub const MAX_NORMALIZE_DEPTH: usize = 10;

/// Keys searched in a mapping, highest priority first.
const CANDIDATE_KEYS: [&str; 6] = ["response", "message", "answer", "content", "text", "data"];

/// Normalize a backend payload into display text.
pub fn normalize(value: &Value) -> String {
    normalize_with_depth(value, MAX_NORMALIZE_DEPTH)
}

/// Normalize a raw response body.
pub fn normalize_str(raw: &str) -> String {
    normalize_text(raw, MAX_NORMALIZE_DEPTH)
}

/// Normalize with an explicit budget of remaining layers.
///
/// With a budget of zero, strings are returned verbatim and mappings are
/// pretty-printed without looking at their keys.
pub fn normalize_with_depth(value: &Value, depth: usize) -> String {
    match value {
        Value::String(s) => normalize_text(s, depth),
        Value::Object(map) => normalize_object(map, depth),
        other => stringify(other),
    }
}

fn normalize_text(raw: &str, depth: usize) -> String {
    if depth == 0 {
        return raw.to_owned();
    }
    // Only a parsed mapping is unwrapped further. Scalars and arrays that
    // happen to be valid JSON are shown as the original text.
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => normalize_object(&map, depth - 1),
        _ => raw.to_owned(),
    }
}

fn normalize_object(map: &Map<String, Value>, depth: usize) -> String {
    if depth > 0 {
        let candidate = CANDIDATE_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|value| is_truthy(value));
        if let Some(value) = candidate {
            return normalize_with_depth(value, depth - 1);
        }
    }
    serde_json::to_string_pretty(map).unwrap_or_default()
}

/// JavaScript-style truthiness: `null`, `false`, `""` and `0` are falsy.
///
/// Decides whether a candidate key counts, here and wherever a reply field
/// falls back to another.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            // Integral floats render without a fractional part ("2", not "2.0").
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_is_unchanged() {
        for s in ["hello", "not { json", "", "Tell me about yourself.", "{\"unterminated\": "] {
            assert_eq!(normalize(&json!(s)), s);
            assert_eq!(normalize_str(s), s);
        }
    }

    #[test]
    fn test_json_scalars_in_strings_are_unchanged() {
        assert_eq!(normalize_str("42"), "42");
        assert_eq!(normalize_str("[1, 2]"), "[1, 2]");
        assert_eq!(normalize_str("\"quoted\""), "\"quoted\"");
        assert_eq!(normalize_str("null"), "null");
    }

    #[test]
    fn test_response_wins_over_message() {
        let payload = json!({"message": "second", "response": "first"});
        assert_eq!(normalize(&payload), "first");
    }

    #[test]
    fn test_candidate_priority_order() {
        assert_eq!(normalize(&json!({"data": "d", "text": "t"})), "t");
        assert_eq!(normalize(&json!({"data": "d", "answer": "a", "content": "c"})), "a");
    }

    #[test]
    fn test_falsy_candidates_are_skipped() {
        let payload = json!({"response": "", "message": null, "answer": 0, "content": false, "text": "fallback"});
        assert_eq!(normalize(&payload), "fallback");
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(""), json!(0), json!(0.0)] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!("0"), json!(-1), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn test_nested_stringified_json_is_unwrapped() {
        let payload = json!({"message": "{\"content\":\"hi\"}"});
        assert_eq!(normalize(&payload), "hi");
    }

    #[test]
    fn test_stringified_top_level_object() {
        let raw = r#"{"response": {"answer": "Describe a hard bug you fixed."}}"#;
        assert_eq!(normalize_str(raw), "Describe a hard bug you fixed.");
    }

    #[test]
    fn test_nested_mapping_is_unwrapped() {
        let payload = json!({"data": {"response": {"text": "deep"}}});
        assert_eq!(normalize(&payload), "deep");
    }

    #[test]
    fn test_no_candidate_key_falls_back_to_pretty_json() {
        let payload = json!({"foo": "bar"});
        assert_eq!(normalize(&payload), "{\n  \"foo\": \"bar\"\n}");
    }

    #[test]
    fn test_pretty_json_has_stable_key_order() {
        let payload: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": 2}"#).unwrap();
        assert_eq!(normalize(&payload), "{\n  \"alpha\": 2,\n  \"zeta\": 1\n}");
    }

    #[test]
    fn test_scalar_candidate_is_stringified() {
        assert_eq!(normalize(&json!({"answer": 7})), "7");
        assert_eq!(normalize(&json!({"content": true})), "true");
    }

    #[test]
    fn test_non_mapping_values_are_stringified() {
        assert_eq!(normalize(&json!(42)), "42");
        assert_eq!(normalize(&json!(2.5)), "2.5");
        assert_eq!(normalize(&json!(3.0)), "3");
        assert_eq!(normalize(&json!(true)), "true");
        assert_eq!(normalize(&Value::Null), "null");
        assert_eq!(normalize(&json!(["a", 1])), "[\"a\",1]");
    }

    #[test]
    fn test_depth_bound_stops_unwrapping() {
        let mut payload = json!("bottom");
        for _ in 0..50 {
            payload = json!({ "data": payload });
        }
        let out = normalize(&payload);
        assert!(out.starts_with('{'), "expected JSON fallback, got {out}");
        assert!(out.contains("bottom"));
    }

    #[test]
    fn test_zero_depth_renders_verbatim() {
        assert_eq!(normalize_with_depth(&json!("{\"text\":\"x\"}"), 0), "{\"text\":\"x\"}");
        assert_eq!(normalize_with_depth(&json!({"text": "x"}), 0), "{\n  \"text\": \"x\"\n}");
    }
}
