use serde_json::Value;

use crate::validate::validator::Validator;

pub(crate) const MISSING: &str = "Missing required field";

pub(crate) fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Required string field; returns the string when present and typed correctly.
pub(crate) fn require_string<'a>(
    v: &mut Validator,
    parent: &'a serde_json::Map<String, Value>,
    path: &str,
    field: &str,
) -> Option<&'a str> {
    match parent.get(field) {
        None | Some(Value::Null) => {
            v.push(format!("{path}.{field}"), MISSING);
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            v.push(
                format!("{path}.{field}"),
                format!("Must be a string, got {}", type_name(other)),
            );
            None
        }
    }
}

pub(crate) fn require_non_empty_string(
    v: &mut Validator,
    parent: &serde_json::Map<String, Value>,
    path: &str,
    field: &str,
) {
    if let Some(s) = require_string(v, parent, path, field) {
        if s.trim().is_empty() {
            v.push(format!("{path}.{field}"), "Must not be empty");
        }
    }
}

pub(crate) fn optional_string_array(
    v: &mut Validator,
    parent: &serde_json::Map<String, Value>,
    path: &str,
    field: &str,
) {
    let Some(value) = parent.get(field) else {
        return;
    };
    let Some(items) = value.as_array() else {
        v.push(
            format!("{path}.{field}"),
            format!("Must be an array, got {}", type_name(value)),
        );
        return;
    };
    for (idx, item) in items.iter().enumerate() {
        if !item.is_string() {
            v.push(format!("{path}.{field}[{idx}]"), "Must be a string");
        }
    }
}
