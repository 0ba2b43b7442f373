//! Combinators: `allOf`, `anyOf`, `oneOf`, `not`.
//!
//! `allOf` and `anyOf` descend through
//! [`Walker::descend_branch`](crate::engine::Walker) so the unknown-properties
//! union check at the enclosing node can switch the ban off per branch.
//! `oneOf` and `not` descend normally.

use serde_json::{Map, Value};
use sks_core::json::render;
use sks_core::{PathChunk, SchemaError, ValidationError};

use crate::engine::Walker;

pub fn all_of(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::Array(branches) = value else {
        return Ok(Vec::new());
    };
    let mut errors = Vec::new();
    for (index, branch) in branches.iter().enumerate() {
        errors.extend(walker.descend_branch(instance, branch, index)?);
    }
    Ok(errors)
}

pub fn any_of(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::Array(branches) = value else {
        return Ok(Vec::new());
    };
    let mut context = Vec::new();
    for (index, branch) in branches.iter().enumerate() {
        let errors = walker.descend_branch(instance, branch, index)?;
        if errors.is_empty() {
            return Ok(Vec::new());
        }
        context.extend(errors);
    }
    Ok(vec![ValidationError::new(format!(
        "{} is not valid under any of the given schemas",
        render(instance)
    ))
    .with_context(context)])
}

pub fn one_of(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::Array(branches) = value else {
        return Ok(Vec::new());
    };

    let mut context = Vec::new();
    let mut first_valid = None;
    for (index, branch) in branches.iter().enumerate() {
        let errors = walker.descend_at(instance, branch, None, Some(PathChunk::Index(index)))?;
        if errors.is_empty() {
            first_valid = Some(index);
            break;
        }
        context.extend(errors);
    }
    let Some(first) = first_valid else {
        return Ok(vec![ValidationError::new(format!(
            "{} is not valid under any of the given schemas",
            render(instance)
        ))
        .with_context(context)]);
    };

    let mut also_valid = Vec::new();
    for branch in &branches[first + 1..] {
        if walker.is_valid(instance, branch)? {
            also_valid.push(branch);
        }
    }
    if also_valid.is_empty() {
        return Ok(Vec::new());
    }
    also_valid.push(&branches[first]);
    let rendered = also_valid
        .iter()
        .map(|branch| render(branch))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(vec![ValidationError::new(format!(
        "{} is valid under each of {rendered}",
        render(instance)
    ))])
}

pub fn not(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    if !walker.is_valid(instance, value)? {
        return Ok(Vec::new());
    }
    Ok(vec![ValidationError::new(format!(
        "{} is not allowed for {}",
        render(value),
        render(instance)
    ))])
}
