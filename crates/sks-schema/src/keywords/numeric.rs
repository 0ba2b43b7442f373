//! Numeric keywords: `minimum`/`exclusiveMinimum`,
//! `maximum`/`exclusiveMaximum`, `multipleOf` (Draft 3 `divisibleBy`).

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};
use sks_core::json::render;
use sks_core::{SchemaError, ValidationError};

use crate::engine::Walker;

/// Compare exactly when both sides are integers, by `f64` otherwise.
fn compare(left: &Number, right: &Number) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return Some(l.cmp(&r));
    }
    if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        return Some(l.cmp(&r));
    }
    left.as_f64()?.partial_cmp(&right.as_f64()?)
}

fn exclusive(schema: &Map<String, Value>, keyword: &str) -> bool {
    schema.get(keyword).and_then(Value::as_bool).unwrap_or(false)
}

pub fn minimum(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let (Value::Number(limit), Value::Number(number)) = (value, instance) else {
        return Ok(Vec::new());
    };
    let Some(ordering) = compare(number, limit) else {
        return Ok(Vec::new());
    };
    let (failed, cmp) = if exclusive(schema, "exclusiveMinimum") {
        (ordering != Ordering::Greater, "less than or equal to")
    } else {
        (ordering == Ordering::Less, "less than")
    };
    if !failed {
        return Ok(Vec::new());
    }
    Ok(vec![ValidationError::new(format!(
        "{} is {cmp} the minimum of {}",
        render(instance),
        render(value)
    ))])
}

pub fn maximum(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let (Value::Number(limit), Value::Number(number)) = (value, instance) else {
        return Ok(Vec::new());
    };
    let Some(ordering) = compare(number, limit) else {
        return Ok(Vec::new());
    };
    let (failed, cmp) = if exclusive(schema, "exclusiveMaximum") {
        (ordering != Ordering::Less, "greater than or equal to")
    } else {
        (ordering == Ordering::Greater, "greater than")
    };
    if !failed {
        return Ok(Vec::new());
    }
    Ok(vec![ValidationError::new(format!(
        "{} is {cmp} the maximum of {}",
        render(instance),
        render(value)
    ))])
}

pub fn multiple_of(
    _walker: &mut Walker<'_>,
    value: &Value,
    instance: &Value,
    _schema: &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let (Value::Number(divisor), Value::Number(number)) = (value, instance) else {
        return Ok(Vec::new());
    };
    if is_multiple(number, divisor) {
        return Ok(Vec::new());
    }
    Ok(vec![ValidationError::new(format!(
        "{} is not a multiple of {}",
        render(instance),
        render(value)
    ))])
}

fn is_multiple(number: &Number, divisor: &Number) -> bool {
    if let (Some(n), Some(d)) = (number.as_i64(), divisor.as_i64()) {
        return d == 0 || n % d == 0;
    }
    if let (Some(n), Some(d)) = (number.as_u64(), divisor.as_u64()) {
        return d == 0 || n % d == 0;
    }
    match (number.as_f64(), divisor.as_f64()) {
        (Some(_), Some(d)) if d == 0.0 => true,
        (Some(n), Some(d)) => {
            let quotient = n / d;
            quotient.is_finite() && quotient.fract() == 0.0
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(value: Value) -> Number {
        match value {
            Value::Number(n) => n,
            other => panic!("not a number: {other}"),
        }
    }

    #[test]
    fn integer_and_float_multiples() {
        assert!(is_multiple(&num(json!(10)), &num(json!(5))));
        assert!(!is_multiple(&num(json!(10)), &num(json!(3))));
        assert!(is_multiple(&num(json!(7.5)), &num(json!(2.5))));
        assert!(!is_multiple(&num(json!(7.5)), &num(json!(2))));
    }

    #[test]
    fn compare_mixes_integers_and_floats() {
        assert_eq!(compare(&num(json!(3)), &num(json!(3.0))), Some(Ordering::Equal));
        assert_eq!(compare(&num(json!(u64::MAX)), &num(json!(1))), Some(Ordering::Greater));
        assert_eq!(compare(&num(json!(-1)), &num(json!(0.5))), Some(Ordering::Less));
    }
}
