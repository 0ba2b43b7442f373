//! # Validation Errors: One Failed Constraint Occurrence
//!
//! A [`ValidationError`] is created by a keyword validator with just a
//! message. The engine then back-fills the keyword name, its declared value,
//! the instance and the schema node (only where the creator left them
//! unset), and prepends path chunks at every enclosing level.

use std::fmt;

use serde_json::Value;

use crate::path::{JsonPath, PathChunk};

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    message: String,
    validator: Option<String>,
    validator_value: Option<Value>,
    instance: Option<Value>,
    schema: Option<Value>,
    schema_path: JsonPath,
    absolute_path: JsonPath,
    context: Vec<ValidationError>,
}

impl ValidationError {
    /// A new error carrying only its message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            validator: None,
            validator_value: None,
            instance: None,
            schema: None,
            schema_path: JsonPath::new(),
            absolute_path: JsonPath::new(),
            context: Vec::new(),
        }
    }

    /// Attach the per-branch errors that explain a combinator failure.
    pub fn with_context(mut self, context: Vec<ValidationError>) -> Self {
        self.context = context;
        self
    }

    /// Set the keyword name and its declared value, overriding whatever the
    /// engine would otherwise back-fill.
    pub fn with_keyword(mut self, keyword: impl Into<String>, value: Value) -> Self {
        self.validator = Some(keyword.into());
        self.validator_value = Some(value);
        self
    }

    /// Extend the schema path at the leaf end.
    pub fn with_schema_suffix(mut self, chunk: impl Into<PathChunk>) -> Self {
        self.schema_path.push_back(chunk);
        self
    }

    /// Back-fill attributes the creator left unset.
    pub fn fill(&mut self, keyword: &str, value: &Value, instance: &Value, schema: &Value) {
        if self.validator.is_none() {
            self.validator = Some(keyword.to_string());
        }
        if self.validator_value.is_none() {
            self.validator_value = Some(value.clone());
        }
        if self.instance.is_none() {
            self.instance = Some(instance.clone());
        }
        if self.schema.is_none() {
            self.schema = Some(schema.clone());
        }
    }

    /// Prepend a chunk to the schema path.
    pub fn prepend_schema_path(&mut self, chunk: impl Into<PathChunk>) {
        self.schema_path.push_front(chunk);
    }

    /// Prepend a chunk to the instance path.
    pub fn prepend_path(&mut self, chunk: impl Into<PathChunk>) {
        self.absolute_path.push_front(chunk);
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Keyword that produced the error, e.g. `type` or `banUnknownProperties`.
    pub fn validator(&self) -> Option<&str> {
        self.validator.as_deref()
    }

    /// The keyword's declared value in the schema.
    pub fn validator_value(&self) -> Option<&Value> {
        self.validator_value.as_ref()
    }

    /// The offending instance (sub)value.
    pub fn instance(&self) -> Option<&Value> {
        self.instance.as_ref()
    }

    /// The schema fragment that produced the error.
    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    /// Keywords from the root schema down to the failing one.
    pub fn schema_path(&self) -> &JsonPath {
        &self.schema_path
    }

    /// Property names and indices from the root instance to the failure.
    pub fn absolute_path(&self) -> &JsonPath {
        &self.absolute_path
    }

    /// Sub-errors for `anyOf` / `oneOf` failures.
    pub fn context(&self) -> &[ValidationError] {
        &self.context
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        let Some(keyword) = &self.validator else {
            return Ok(());
        };
        write!(
            f,
            "\n\nFailed validating '{keyword}' in schema{}:\n",
            self.schema_path.bracketed()
        )?;
        match &self.schema {
            Some(schema) => write!(f, "{schema:#}")?,
            None => f.write_str("null")?,
        }
        write!(f, "\n\nOn instance{}:\n", self.absolute_path.bracketed())?;
        match &self.instance {
            Some(instance) => write!(f, "{instance:#}"),
            None => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fill_only_sets_missing_fields() {
        let mut err = ValidationError::new("boom").with_keyword("required", json!(["a"]));
        err.fill("properties", &json!({}), &json!({"b": 1}), &json!({"required": ["a"]}));
        assert_eq!(err.validator(), Some("required"));
        assert_eq!(err.validator_value(), Some(&json!(["a"])));
        assert_eq!(err.instance(), Some(&json!({"b": 1})));
    }

    #[test]
    fn paths_prepend_root_ward() {
        let mut err = ValidationError::new("bad").with_schema_suffix("type");
        err.prepend_schema_path("a");
        err.prepend_schema_path("properties");
        err.prepend_path("a");
        assert_eq!(err.schema_path().dotted(), "properties.a.type");
        assert_eq!(err.absolute_path().dotted(), "a");
    }

    #[test]
    fn display_without_keyword_is_just_the_message() {
        assert_eq!(ValidationError::new("plain").to_string(), "plain");
    }

    #[test]
    fn display_with_keyword_names_locations() {
        let mut err = ValidationError::new("1 is not of type 'string'");
        err.fill("type", &json!("string"), &json!(1), &json!({"type": "string"}));
        err.prepend_schema_path("type");
        err.prepend_path("name");
        let text = err.to_string();
        assert!(text.starts_with("1 is not of type 'string'\n\nFailed validating 'type' in schema['type']"));
        assert!(text.contains("On instance['name']:\n1"));
    }
}
