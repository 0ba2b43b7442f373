//! # `banUnknownProperties`
//!
//! A non-standard keyword forbidding instance properties the applicable
//! schema does not declare. Two forms exist:
//!
//! - **Plain object**: on a schema declaring `properties` or
//!   `patternProperties`, object keys covered by neither are unknown. This
//!   is the registered keyword validator.
//! - **Combinator union**: on a schema with a non-empty `allOf` or `anyOf`,
//!   the declarations of every branch (a `$ref` branch resolved one hop) are
//!   merged and checked as one object schema. Object instances contribute
//!   their keys; array instances contribute their string elements, other
//!   elements are ignored. Nested combinators inside branches are not
//!   flattened.
//!
//! Instances of any other shape never produce a ban error; `type` is left
//! to catch shape mismatches.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use sks_core::json::{does_do, quoted_list, was_were};
use sks_core::{PathChunk, SchemaError, ValidationError, BAN_UNKNOWN_PROPERTIES};

use crate::engine::Walker;
use crate::keywords::object::find_additional_properties;

/// Plain-object form. `value` is the node's effective ban flag.
pub(crate) fn ban_unknown_properties(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    if !value.as_bool().unwrap_or(false) {
        return Ok(Vec::new());
    }
    let Value::Object(object) = instance else {
        return Ok(Vec::new());
    };
    if !(schema.contains_key("properties") || schema.contains_key("patternProperties")) {
        return Ok(Vec::new());
    }

    let extras: BTreeSet<&str> = find_additional_properties(walker, object, schema)?
        .into_iter()
        .collect();
    if extras.is_empty() {
        return Ok(Vec::new());
    }
    let patterns: BTreeSet<&str> = schema
        .get("patternProperties")
        .and_then(Value::as_object)
        .map(|p| p.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let rendered = Value::Object(schema.clone()).to_string();
    tracing::debug!(extras = extras.len(), "unknown properties on object schema");
    Ok(vec![unknown_properties_error(&extras, &patterns, &rendered)])
}

/// Combinator-union form for one `allOf`/`anyOf` list.
///
/// The returned error is complete: keyword, value, instance and schema
/// (the branch list) are set and the schema path is
/// `banUnknownProperties`.
pub(crate) fn ban_unknown_in_branches(
    walker: &mut Walker<'_>,
    effective: bool,
    instance: &Value,
    branches: &[Value],
) -> Result<Vec<ValidationError>, SchemaError> {
    let candidates: Vec<&str> = match instance {
        Value::Object(object) => object.keys().map(String::as_str).collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => return Ok(Vec::new()),
    };

    let mut properties: BTreeSet<String> = BTreeSet::new();
    let mut patterns: BTreeSet<String> = BTreeSet::new();
    for branch in branches {
        let resolved;
        let declared = match branch.get("$ref").and_then(Value::as_str) {
            Some(reference) => {
                resolved = walker.resolve(reference)?;
                resolved.schema.as_ref()
            }
            None => branch,
        };
        if let Some(props) = declared.get("properties").and_then(Value::as_object) {
            properties.extend(props.keys().cloned());
        }
        if let Some(props) = declared.get("patternProperties").and_then(Value::as_object) {
            patterns.extend(props.keys().cloned());
        }
    }

    let union = if patterns.is_empty() {
        None
    } else {
        let joined = patterns.iter().map(String::as_str).collect::<Vec<_>>().join("|");
        Some(walker.regex(&joined)?)
    };
    let extras: BTreeSet<&str> = candidates
        .into_iter()
        .filter(|name| !properties.contains(*name))
        .filter(|name| !union.as_ref().is_some_and(|regex| regex.is_match(name)))
        .collect();
    if extras.is_empty() {
        return Ok(Vec::new());
    }

    let branch_list = Value::Array(branches.to_vec());
    let pattern_names: BTreeSet<&str> = patterns.iter().map(String::as_str).collect();
    let mut error = unknown_properties_error(&extras, &pattern_names, &branch_list.to_string());
    error.fill(
        BAN_UNKNOWN_PROPERTIES,
        &Value::Bool(effective),
        instance,
        &branch_list,
    );
    error.prepend_schema_path(PathChunk::from(BAN_UNKNOWN_PROPERTIES));
    tracing::debug!(extras = extras.len(), "unknown properties across combinator branches");
    Ok(vec![error])
}

fn unknown_properties_error(
    extras: &BTreeSet<&str>,
    patterns: &BTreeSet<&str>,
    rendered_schema: &str,
) -> ValidationError {
    let names = quoted_list(extras.iter().copied());
    let message = if patterns.is_empty() {
        format!(
            "{BAN_UNKNOWN_PROPERTIES} (Additional properties are not allowed ({names} {} unexpected))\nschema: {rendered_schema}",
            was_were(extras.len()),
        )
    } else {
        format!(
            "{BAN_UNKNOWN_PROPERTIES}: {names} {} not match any of the regexes: {}",
            does_do(extras.len()),
            quoted_list(patterns.iter().copied()),
        )
    };
    ValidationError::new(message)
}
