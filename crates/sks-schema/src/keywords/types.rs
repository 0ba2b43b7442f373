//! `type` (Draft 4) and `enum`.

use serde_json::{Map, Value};
use sks_core::json::{is_type, json_equal, quoted_list, render};
use sks_core::{SchemaError, ValidationError};

use super::string_list;
use crate::engine::Walker;

/// Draft 4 `type`: a primitive name or a list of them.
///
/// # Errors
///
/// [`SchemaError::UnknownType`] for a name reached before any match.
pub fn type_draft4(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let types = string_list(value);
    for name in &types {
        if is_type(instance, name)? {
            return Ok(Vec::new());
        }
    }
    Ok(vec![ValidationError::new(format!(
        "{} is not of type {}",
        render(instance),
        quoted_list(types)
    ))])
}

pub fn enumeration(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::Array(allowed) = value else {
        return Ok(Vec::new());
    };
    if allowed.iter().any(|candidate| json_equal(candidate, instance)) {
        return Ok(Vec::new());
    }
    Ok(vec![ValidationError::new(format!(
        "{} is not one of {}",
        render(instance),
        render(value)
    ))])
}
