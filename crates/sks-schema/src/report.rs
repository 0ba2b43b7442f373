//! # Error Aggregation
//!
//! Drains a validation call into a deterministic report. Errors are sorted
//! by their full `Display` text (message plus locations) rather than by
//! structured fields, which keeps output stable and diff-friendly.

use std::fmt;

use sks_core::json::render;
use sks_core::{ValidationError, ValidationFailed};

/// Sorted collection of violations from one validation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Sort `errors` by their rendered text.
    pub fn sorted(mut errors: Vec<ValidationError>) -> Self {
        errors.sort_by_cached_key(ToString::to_string);
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }

    /// `Ok` when empty, otherwise the aggregate failure.
    ///
    /// # Errors
    ///
    /// [`ValidationFailed`] carrying the count and every formatted block.
    pub fn into_result(self) -> Result<(), ValidationFailed> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ValidationFailed {
            count: self.errors.len(),
            report: self.to_string(),
        })
    }
}

/// One block per error: message, dot-joined instance path, instance value.
impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            let instance = error.instance().map(render).unwrap_or_else(|| "null".to_string());
            write!(
                f,
                "\n-----\n{}\n at path \n{}\n in instance \n{instance}",
                error.message(),
                error.absolute_path().dotted(),
            )?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
