//! # Keyword Registry
//!
//! Maps keyword names to validation functions. Keywords nobody registered
//! are ignored during validation, as JSON Schema treats unknown keywords as
//! annotations. A registry is plain data: clone one of the draft presets and
//! [`register`](Registry::register) extra keywords to extend it.

use std::collections::HashMap;

use serde_json::{Map, Value};
use sks_core::{Draft, SchemaError, ValidationError, BAN_UNKNOWN_PROPERTIES};

use crate::ban;
use crate::engine::Walker;
use crate::keywords::{array, combinators, draft3, numeric, object, reference, string, types};

/// A keyword validator.
///
/// Arguments are the walker, the keyword's value, the instance and the
/// schema object holding the keyword. Constraint failures are returned as
/// errors in the `Ok` vector; `Err` is reserved for structural problems.
pub type KeywordFn = fn(
    &mut Walker<'_>,
    &Value,
    &Value,
    &Map<String, Value>,
) -> Result<Vec<ValidationError>, SchemaError>;

/// Keyword name → validator.
#[derive(Clone, Default)]
pub struct Registry {
    keywords: HashMap<String, KeywordFn>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("keywords", &self.keywords())
            .finish()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The keyword set for `draft`.
    pub fn for_draft(draft: Draft) -> Self {
        match draft {
            Draft::Draft3 => Self::draft3(),
            Draft::Draft4 => Self::draft4(),
        }
    }

    /// Draft 4 keywords plus `banUnknownProperties`.
    pub fn draft4() -> Self {
        let mut registry = Self::shared();
        registry.register("additionalProperties", object::additional_properties);
        registry.register("allOf", combinators::all_of);
        registry.register("anyOf", combinators::any_of);
        registry.register("dependencies", object::dependencies);
        registry.register("maxProperties", object::max_properties);
        registry.register("minProperties", object::min_properties);
        registry.register("multipleOf", numeric::multiple_of);
        registry.register("not", combinators::not);
        registry.register("oneOf", combinators::one_of);
        registry.register("properties", object::properties);
        registry.register("required", object::required);
        registry.register("type", types::type_draft4);
        registry
    }

    /// Draft 3 keywords plus `banUnknownProperties`.
    pub fn draft3() -> Self {
        let mut registry = Self::shared();
        registry.register("additionalProperties", object::additional_properties);
        registry.register("dependencies", draft3::dependencies);
        registry.register("disallow", draft3::disallow);
        registry.register("divisibleBy", numeric::multiple_of);
        registry.register("extends", draft3::extends);
        registry.register("properties", draft3::properties);
        registry.register("type", draft3::type_draft3);
        registry
    }

    fn shared() -> Self {
        let mut registry = Self::new();
        registry.register("$ref", reference::reference);
        registry.register("additionalItems", array::additional_items);
        registry.register(BAN_UNKNOWN_PROPERTIES, ban::ban_unknown_properties);
        registry.register("enum", types::enumeration);
        registry.register("items", array::items);
        registry.register("maxItems", array::max_items);
        registry.register("maxLength", string::max_length);
        registry.register("maximum", numeric::maximum);
        registry.register("minItems", array::min_items);
        registry.register("minLength", string::min_length);
        registry.register("minimum", numeric::minimum);
        registry.register("pattern", string::pattern);
        registry.register("patternProperties", object::pattern_properties);
        registry.register("uniqueItems", array::unique_items);
        registry
    }

    /// Register (or replace) `keyword`, returning the previous validator.
    pub fn register(&mut self, keyword: impl Into<String>, validator: KeywordFn) -> Option<KeywordFn> {
        self.keywords.insert(keyword.into(), validator)
    }

    /// Remove `keyword`.
    pub fn unregister(&mut self, keyword: &str) -> Option<KeywordFn> {
        self.keywords.remove(keyword)
    }

    pub fn lookup(&self, keyword: &str) -> Option<KeywordFn> {
        self.keywords.get(keyword).copied()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.contains_key(keyword)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Registered keyword names, sorted.
    pub fn keywords(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keywords.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(
        _: &mut Walker<'_>,
        _: &Value,
        _: &Value,
        _: &Map<String, Value>,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        Ok(Vec::new())
    }

    #[test]
    fn draft4_covers_core_keywords() {
        let registry = Registry::draft4();
        for keyword in [
            "$ref", "type", "enum", "required", "properties", "patternProperties",
            "additionalProperties", "items", "minimum", "maximum", "minLength",
            "maxLength", "pattern", "allOf", "anyOf", "oneOf", "not",
            BAN_UNKNOWN_PROPERTIES,
        ] {
            assert!(registry.contains(keyword), "missing {keyword}");
        }
        assert!(!registry.contains("format"));
        assert!(!registry.contains("extends"));
    }

    #[test]
    fn draft3_has_its_own_vocabulary() {
        let registry = Registry::draft3();
        assert!(registry.contains("extends"));
        assert!(registry.contains("disallow"));
        assert!(registry.contains("divisibleBy"));
        assert!(!registry.contains("allOf"));
        assert!(!registry.contains("required"));
    }

    #[test]
    fn register_replaces_and_returns_previous() {
        let mut registry = Registry::new();
        assert!(registry.register("x-custom", noop).is_none());
        assert!(registry.register("x-custom", noop).is_some());
        assert_eq!(registry.keywords(), vec!["x-custom"]);
        assert!(registry.unregister("x-custom").is_some());
        assert!(registry.is_empty());
    }
}
