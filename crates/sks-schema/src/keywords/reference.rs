//! `$ref`: validate against the referenced schema instead of the current
//! node. The target is validated with its own URI as the resolution scope;
//! re-entering a target for the same instance is a reference cycle.

use serde_json::{Map, Value};
use sks_core::{SchemaError, ValidationError};

use crate::engine::Walker;

pub fn reference(
    walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let Value::String(reference) = value else {
        return Err(SchemaError::InvalidReference {
            reference: value.to_string(),
            reason: "$ref must be a string".to_string(),
        });
    };
    let resolved = walker.resolve(reference)?;
    walker.follow_reference(reference, &resolved, instance)
}
