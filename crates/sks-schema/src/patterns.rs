//! Compiled-regex cache shared by `pattern`, `patternProperties`,
//! `additionalProperties` and the unknown-properties ban.

use std::collections::HashMap;

use parking_lot::RwLock;
use regex::Regex;
use sks_core::SchemaError;

/// Pattern text → compiled regex. Matching is unanchored search.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled form of `pattern`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidPattern`] if `pattern` does not compile.
    pub fn get(&self, pattern: &str) -> Result<Regex, SchemaError> {
        if let Some(regex) = self.compiled.read().get(pattern) {
            return Ok(regex.clone());
        }
        let regex = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.compiled
            .write()
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    pub fn len(&self) -> usize {
        self.compiled.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.read().is_empty()
    }
}
