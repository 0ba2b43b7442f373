//! # Keyword Validators
//!
//! One function per keyword, grouped by the instance shape they constrain.
//! All share the [`KeywordFn`](crate::registry::KeywordFn) signature and
//! quietly accept instances of a shape they do not apply to; the `type`
//! keyword is responsible for shape mismatches.

pub mod array;
pub mod combinators;
pub mod draft3;
pub mod numeric;
pub mod object;
pub mod reference;
pub mod string;
pub mod types;

use serde_json::Value;

/// A non-negative integral keyword value (`minItems`, `maxLength`, ...).
pub(crate) fn as_limit(value: &Value) -> Option<usize> {
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
        .and_then(|n| usize::try_from(n).ok())
}

/// A string or list-of-strings keyword value as a list.
pub(crate) fn string_list(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}
