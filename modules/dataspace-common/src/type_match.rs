use serde_json::Value;

/// Compare a JSON-LD `type` value against an expected tag.
///
/// A list matches when it contains `expected`, a string when it equals it.
/// Anything else, including a missing value, never matches.
pub fn is_type_match(actual: Option<&Value>, expected: &str) -> bool {
    match actual {
        Some(Value::String(tag)) => tag == expected,
        Some(Value::Array(tags)) => tags.iter().any(|t| t.as_str() == Some(expected)),
        _ => false,
    }
}
