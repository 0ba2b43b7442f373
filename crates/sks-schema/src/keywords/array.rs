//! Array keywords: `items`, `additionalItems`, `minItems`, `maxItems`,
//! `uniqueItems`.

use serde_json::{Map, Value};
use sks_core::json::{json_equal, render, was_were};
use sks_core::{PathChunk, SchemaError, ValidationError};

use super::as_limit;
use crate::engine::Walker;

/// List form validates positionally; object form validates every element.
pub fn items(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::Array(elements) = instance else {
        return Ok(Vec::new());
    };
    let mut errors = Vec::new();
    match value {
        Value::Array(schemas) => {
            for (index, (element, subschema)) in elements.iter().zip(schemas).enumerate() {
                errors.extend(walker.descend_at(
                    element,
                    subschema,
                    Some(PathChunk::Index(index)),
                    Some(PathChunk::Index(index)),
                )?);
            }
        }
        Value::Object(_) => {
            for (index, element) in elements.iter().enumerate() {
                errors.extend(walker.descend_at(
                    element,
                    value,
                    Some(PathChunk::Index(index)),
                    None,
                )?);
            }
        }
        _ => {}
    }
    Ok(errors)
}

/// Only meaningful when `items` is a list.
pub fn additional_items(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::Array(elements) = instance else {
        return Ok(Vec::new());
    };
    let Some(Value::Array(positional)) = schema.get("items") else {
        return Ok(Vec::new());
    };
    let declared = positional.len();

    match value {
        Value::Object(_) => {
            let mut errors = Vec::new();
            for (index, element) in elements.iter().enumerate().skip(declared) {
                errors.extend(walker.descend_at(
                    element,
                    value,
                    Some(PathChunk::Index(index)),
                    None,
                )?);
            }
            Ok(errors)
        }
        Value::Bool(false) if elements.len() > declared => {
            let extras = &elements[declared..];
            let rendered = extras.iter().map(render).collect::<Vec<_>>().join(", ");
            Ok(vec![ValidationError::new(format!(
                "Additional items are not allowed ({rendered} {} unexpected)",
                was_were(extras.len()),
            ))])
        }
        _ => Ok(Vec::new()),
    }
}

pub fn min_items(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    match (instance, as_limit(value)) {
        (Value::Array(elements), Some(limit)) if elements.len() < limit => Ok(vec![
            ValidationError::new(format!("{} is too short", render(instance))),
        ]),
        _ => Ok(Vec::new()),
    }
}

pub fn max_items(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    match (instance, as_limit(value)) {
        (Value::Array(elements), Some(limit)) if elements.len() > limit => Ok(vec![
            ValidationError::new(format!("{} is too long", render(instance))),
        ]),
        _ => Ok(Vec::new()),
    }
}

pub fn unique_items(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let (Value::Bool(true), Value::Array(elements)) = (value, instance) else {
        return Ok(Vec::new());
    };
    let duplicated = elements
        .iter()
        .enumerate()
        .any(|(i, a)| elements[i + 1..].iter().any(|b| json_equal(a, b)));
    if duplicated {
        Ok(vec![ValidationError::new(format!(
            "{} has non-unique elements",
            render(instance)
        ))])
    } else {
        Ok(Vec::new())
    }
}
