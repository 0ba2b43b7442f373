//! # JSON Value Helpers
//!
//! Type predicates and comparisons over `serde_json::Value`, inspected by
//! variant. Keyword validators use these instead of ad-hoc matching so every
//! keyword agrees on what "integer" or "equal" means.

use serde_json::Value;

use crate::error::SchemaError;

/// Primitive type names understood by the `type` keyword.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "array", "boolean", "integer", "null", "number", "object", "string",
];

/// Whether `instance` is of the named primitive type.
///
/// `integer` accepts only integral number literals (`3`, not `3.0`).
///
/// # Errors
///
/// Returns [`SchemaError::UnknownType`] for names outside [`PRIMITIVE_TYPES`].
pub fn is_type(instance: &Value, name: &str) -> Result<bool, SchemaError> {
    let matched = match name {
        "array" => instance.is_array(),
        "boolean" => instance.is_boolean(),
        "integer" => instance.is_i64() || instance.is_u64(),
        "null" => instance.is_null(),
        "number" => instance.is_number(),
        "object" => instance.is_object(),
        "string" => instance.is_string(),
        other => {
            return Err(SchemaError::UnknownType {
                name: other.to_string(),
            })
        }
    };
    Ok(matched)
}

/// The primitive type name of `instance` (`integer` preferred over `number`).
pub fn type_name(instance: &Value) -> &'static str {
    match instance {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Structural equality where numbers compare by value, so `1 == 1.0`.
pub fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
            (Some(l), Some(r)) => l == r,
            _ => match (l.as_u64(), r.as_u64()) {
                (Some(l), Some(r)) => l == r,
                _ => l.as_f64() == r.as_f64(),
            },
        },
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| json_equal(l, r))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l
                    .iter()
                    .all(|(key, lv)| r.get(key).is_some_and(|rv| json_equal(lv, rv)))
        }
        _ => left == right,
    }
}

/// Compact rendering of a value for messages.
pub fn render(value: &Value) -> String {
    value.to_string()
}

/// Single-quoted rendering of a name: `'speed'`.
pub fn quote(name: &str) -> String {
    format!("'{name}'")
}

/// Comma-separated single-quoted names: `'a', 'b'`.
pub fn quoted_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().map(quote).collect::<Vec<_>>().join(", ")
}

/// `was` for one unexpected item, `were` otherwise.
pub fn was_were(count: usize) -> &'static str {
    if count == 1 {
        "was"
    } else {
        "were"
    }
}

/// `does` for one unmatched item, `do` otherwise.
pub fn does_do(count: usize) -> &'static str {
    if count == 1 {
        "does"
    } else {
        "do"
    }
}
