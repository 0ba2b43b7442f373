//! Draft 3 keywords whose semantics differ from Draft 4: `type` with schema
//! members and `any`, `properties` with per-property `required`,
//! `dependencies` with the single-string form, `disallow` and `extends`.

use serde_json::{json, Map, Value};
use sks_core::json::{is_type, quote, render};
use sks_core::{PathChunk, SchemaError, ValidationError};

use super::object::missing_dependencies;
use crate::engine::Walker;

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn describe_types(types: &[&Value]) -> String {
    types
        .iter()
        .map(|t| match t {
            Value::String(name) => quote(name),
            Value::Object(schema) => match schema.get("name").and_then(Value::as_str) {
                Some(name) => quote(name),
                None => render(t),
            },
            other => render(other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn type_draft3(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let types = as_list(value);
    let mut context = Vec::new();
    for (index, member) in types.iter().enumerate() {
        match member {
            Value::String(name) if name == "any" => return Ok(Vec::new()),
            Value::String(name) => {
                if is_type(instance, name)? {
                    return Ok(Vec::new());
                }
            }
            Value::Object(_) => {
                let errors =
                    walker.descend_at(instance, member, None, Some(PathChunk::Index(index)))?;
                if errors.is_empty() {
                    return Ok(Vec::new());
                }
                context.extend(errors);
            }
            _ => {}
        }
    }
    Ok(vec![ValidationError::new(format!(
        "{} is not of type {}",
        render(instance),
        describe_types(&types)
    ))
    .with_context(context)])
}

pub fn disallow(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let mut errors = Vec::new();
    for disallowed in as_list(value) {
        if walker.is_valid(instance, &json!({ "type": [disallowed] }))? {
            errors.push(ValidationError::new(format!(
                "{} is disallowed for {}",
                render(disallowed),
                render(instance)
            )));
        }
    }
    Ok(errors)
}

pub fn extends(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    match value {
        Value::Object(_) => walker.descend(instance, value),
        Value::Array(parents) => {
            let mut errors = Vec::new();
            for (index, parent) in parents.iter().enumerate() {
                errors.extend(walker.descend_at(
                    instance,
                    parent,
                    None,
                    Some(PathChunk::Index(index)),
                )?);
            }
            Ok(errors)
        }
        _ => Ok(Vec::new()),
    }
}

/// Draft 3 `properties`: a property schema may carry `required: true`.
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
        match object.get(name) {
            Some(child) => errors.extend(walker.descend_at(
                child,
                subschema,
                Some(PathChunk::from(name.as_str())),
                Some(PathChunk::from(name.as_str())),
            )?),
            None => {
                let required = subschema.get("required").cloned().unwrap_or(Value::Bool(false));
                if required.as_bool().unwrap_or(false) {
                    errors.push(
                        ValidationError::new(format!("{} is a required property", quote(name)))
                            .with_keyword("required", required)
                            .with_schema_suffix(name.as_str())
                            .with_schema_suffix("required"),
                    );
                }
            }
        }
    }
    Ok(errors)
}

/// Draft 3 `dependencies`: schema, property list, or single property name.
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
            Value::String(_) | Value::Array(_) => {
                errors.extend(missing_dependencies(object, property, dependency))
            }
            _ => {}
        }
    }
    Ok(errors)
}
