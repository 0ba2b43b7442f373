//! Object keywords: `properties`, `patternProperties`,
//! `additionalProperties`, `required`, `dependencies`, `minProperties`,
//! `maxProperties`.

use serde_json::{Map, Value};
use sks_core::json::{does_do, quote, quoted_list, render, was_were};
use sks_core::{PathChunk, SchemaError, ValidationError};

use super::{as_limit, string_list};
use crate::engine::Walker;

/// Keys of `object` covered by neither `properties` nor any
/// `patternProperties` regex of `schema`, in key order.
///
/// # Errors
///
/// [`SchemaError::InvalidPattern`] for an uncompilable pattern.
pub(crate) fn find_additional_properties<'a>(
    walker: &Walker<'_>,
    object: &'a Map<String, Value>,
    schema: &Map<String, Value>,
) -> Result<Vec<&'a str>, SchemaError> {
    let properties = schema.get("properties").and_then(Value::as_object);
    let patterns = match schema.get("patternProperties").and_then(Value::as_object) {
        Some(patterns) => patterns
            .keys()
            .map(|pattern| walker.regex(pattern))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(object
        .keys()
        .filter(|key| !properties.is_some_and(|p| p.contains_key(*key)))
        .filter(|key| !patterns.iter().any(|regex| regex.is_match(key)))
        .map(String::as_str)
        .collect())
}

pub fn properties(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let (Value::Object(properties), Value::Object(object)) = (value, instance) else {
        return Ok(Vec::new());
    };
    let mut errors = Vec::new();
    for (name, subschema) in properties {
        if let Some(child) = object.get(name) {
            errors.extend(walker.descend_at(
                child,
                subschema,
                Some(PathChunk::from(name.as_str())),
                Some(PathChunk::from(name.as_str())),
            )?);
        }
    }
    Ok(errors)
}

pub fn pattern_properties(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let (Value::Object(patterns), Value::Object(object)) = (value, instance) else {
        return Ok(Vec::new());
    };
    let mut errors = Vec::new();
    for (pattern, subschema) in patterns {
        let regex = walker.regex(pattern)?;
        for (key, child) in object {
            if regex.is_match(key) {
                errors.extend(walker.descend_at(
                    child,
                    subschema,
                    Some(PathChunk::from(key.as_str())),
                    Some(PathChunk::from(pattern.as_str())),
                )?);
            }
        }
    }
    Ok(errors)
}

pub fn additional_properties(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::Object(object) = instance else {
        return Ok(Vec::new());
    };
    let extras = find_additional_properties(walker, object, schema)?;

    match value {
        Value::Object(_) => {
            let mut errors = Vec::new();
            for extra in extras {
                if let Some(child) = object.get(extra) {
                    errors.extend(walker.descend_at(
                        child,
                        value,
                        Some(PathChunk::from(extra)),
                        None,
                    )?);
                }
            }
            Ok(errors)
        }
        Value::Bool(false) if !extras.is_empty() => {
            let message = match schema.get("patternProperties").and_then(Value::as_object) {
                Some(patterns) => {
                    let mut sorted = extras.clone();
                    sorted.sort_unstable();
                    format!(
                        "{} {} not match any of the regexes: {}",
                        quoted_list(sorted.iter().copied()),
                        does_do(sorted.len()),
                        quoted_list(patterns.keys().map(String::as_str)),
                    )
                }
                None => format!(
                    "Additional properties are not allowed ({} {} unexpected)",
                    quoted_list(extras.iter().copied()),
                    was_were(extras.len()),
                ),
            };
            Ok(vec![ValidationError::new(message)])
        }
        _ => Ok(Vec::new()),
    }
}

/// Draft 4 `required`.
pub fn required(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::Object(object) = instance else {
        return Ok(Vec::new());
    };
    Ok(string_list(value)
        .into_iter()
        .filter(|name| !object.contains_key(*name))
        .map(|name| ValidationError::new(format!("{} is a required property", quote(name))))
        .collect())
}

/// Draft 4 `dependencies`: schema or property-list form.
pub fn dependencies(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let (Value::Object(dependencies), Value::Object(object)) = (value, instance) else {
        return Ok(Vec::new());
    };
    let mut errors = Vec::new();
    for (property, dependency) in dependencies {
        if !object.contains_key(property) {
            continue;
        }
        match dependency {
            Value::Object(_) => errors.extend(walker.descend_at(
                instance,
                dependency,
                None,
                Some(PathChunk::from(property.as_str())),
            )?),
            Value::Array(_) => errors.extend(missing_dependencies(object, property, dependency)),
            _ => {}
        }
    }
    Ok(errors)
}

/// One error per name in `dependency` absent from `object`.
pub(crate) fn missing_dependencies(
    object: &Map<String, Value>,
    property: &str,
    dependency: &Value,
) -> Vec<ValidationError> {
    string_list(dependency)
        .into_iter()
        .filter(|each| !object.contains_key(*each))
        .map(|each| {
            ValidationError::new(format!(
                "{} is a dependency of {}",
                quote(each),
                quote(property)
            ))
        })
        .collect()
}

pub fn min_properties(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    match (instance, as_limit(value)) {
        (Value::Object(object), Some(limit)) if object.len() < limit => Ok(vec![
            ValidationError::new(format!("{} does not have enough properties", render(instance))),
        ]),
        _ => Ok(Vec::new()),
    }
}

pub fn max_properties(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    match (instance, as_limit(value)) {
        (Value::Object(object), Some(limit)) if object.len() > limit => Ok(vec![
            ValidationError::new(format!("{} has too many properties", render(instance))),
        ]),
        _ => Ok(Vec::new()),
    }
}
