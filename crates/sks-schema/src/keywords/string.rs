//! String keywords: `pattern`, `minLength`, `maxLength`.
//!
//! Lengths count Unicode scalar values, not bytes.

use serde_json::{Map, Value};
use sks_core::json::{quote, render};
use sks_core::{SchemaError, ValidationError};

use super::as_limit;
use crate::engine::Walker;

pub fn pattern(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let (Value::String(pattern), Value::String(text)) = (value, instance) else {
        return Ok(Vec::new());
    };
    if walker.regex(pattern)?.is_match(text) {
        return Ok(Vec::new());
    }
    Ok(vec![ValidationError::new(format!(
        "{} does not match {}",
        render(instance),
        quote(pattern)
    ))])
}

pub fn min_length(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    match (instance, as_limit(value)) {
        (Value::String(text), Some(limit)) if text.chars().count() < limit => Ok(vec![
            ValidationError::new(format!("{} is too short", render(instance))),
        ]),
        _ => Ok(Vec::new()),
    }
}

pub fn max_length(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    match (instance, as_limit(value)) {
        (Value::String(text), Some(limit)) if text.chars().count() > limit => Ok(vec![
            ValidationError::new(format!("{} is too long", render(instance))),
        ]),
        _ => Ok(Vec::new()),
    }
}
