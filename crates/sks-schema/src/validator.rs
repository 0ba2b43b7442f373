//! # Validator API
//!
//! [`Validator`] bundles a root schema with its [`Resolver`], keyword
//! [`Registry`] and compiled-pattern cache. It is immutable after
//! construction and may be shared across threads; every validation call
//! builds its own [`Walker`] with a fresh scope stack.
//!
//! Construction goes through [`ValidatorOptions`]:
//!
//! ```no_run
//! use serde_json::json;
//! use sks_schema::{SchemaValidator, Validator};
//! use sks_core::ValidatorConfig;
//!
//! let validator = Validator::options()
//!     .reset_uri(false)
//!     .from_schema_uri("file:///etc/schemas/root.json")?;
//! validator.assert_is_valid(&json!({"name": "x"}), ValidatorConfig::default())?;
//! # Ok::<(), sks_core::SksError>(())
//! ```

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use sks_core::{Draft, SchemaError, SksError, ValidationError, ValidatorConfig};
use url::Url;

use crate::engine::Walker;
use crate::fetch::{SchemaFetcher, UriFetcher};
use crate::patterns::PatternCache;
use crate::registry::Registry;
use crate::report::ValidationErrors;
use crate::resolver::{load_document, Resolver};

/// Base URI for schemas built from a value without an absolute `id`.
pub const DEFAULT_BASE_URI: &str = "memory:///schema.json";

/// Validation entry points shared by every validator implementation.
pub trait SchemaValidator {
    /// Every violation of `instance`, in walk order.
    ///
    /// The walk completes before the iterator is returned, so a structural
    /// failure anywhere in the schema is reported instead of any violations
    /// found before it. [`is_valid`](SchemaValidator::is_valid) walks the
    /// whole tree for the same reason.
    ///
    /// # Errors
    ///
    /// [`SchemaError`] when the schema itself is broken (unresolvable
    /// `$ref`, fetch failure, invalid pattern).
    fn iter_errors(
        &self,
        instance: &Value,
        config: ValidatorConfig,
    ) -> Result<std::vec::IntoIter<ValidationError>, SchemaError>;

    /// Every violation, sorted by rendered text.
    ///
    /// # Errors
    ///
    /// As [`SchemaValidator::iter_errors`].
    fn list_errors(
        &self,
        instance: &Value,
        config: ValidatorConfig,
    ) -> Result<ValidationErrors, SchemaError> {
        Ok(ValidationErrors::sorted(
            self.iter_errors(instance, config)?.collect(),
        ))
    }

    /// # Errors
    ///
    /// As [`SchemaValidator::iter_errors`].
    fn is_valid(&self, instance: &Value, config: ValidatorConfig) -> Result<bool, SchemaError> {
        Ok(self.iter_errors(instance, config)?.next().is_none())
    }

    /// `Ok` when `instance` has no violations.
    ///
    /// # Errors
    ///
    /// [`SksError::Invalid`] carrying every violation, or
    /// [`SksError::Schema`] for a broken schema.
    fn assert_is_valid(&self, instance: &Value, config: ValidatorConfig) -> Result<(), SksError> {
        self.list_errors(instance, config)?.into_result()?;
        Ok(())
    }
}

/// A compiled root schema.
pub struct Validator {
    schema: Arc<Value>,
    draft: Draft,
    config: ValidatorConfig,
    registry: Registry,
    resolver: Resolver,
    patterns: PatternCache,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("draft", &self.draft)
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Validator {
    pub fn options() -> ValidatorOptions {
        ValidatorOptions::default()
    }

    /// Draft 4 validator for an in-memory schema with default options.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidUri`] if the schema's `id` cannot be parsed.
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        let base_uri = base_uri_for(&schema)?;
        Ok(Self::options().build(schema, base_uri))
    }

    /// Load the schema at `uri` with default options.
    ///
    /// # Errors
    ///
    /// Invalid URI, fetch and decoding failures.
    pub fn from_schema_uri(uri: &str) -> Result<Self, SchemaError> {
        Self::options().from_schema_uri(uri)
    }

    /// Load the schema file at `path` with default options.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Io`] if the path cannot be canonicalized, then as
    /// [`Validator::from_schema_uri`].
    pub fn from_schema_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::options().from_schema_path(path)
    }

    /// The root schema, after any `id` stripping.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// Default per-call configuration used by [`Validator::validate`].
    pub fn config(&self) -> ValidatorConfig {
        self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// [`SchemaValidator::assert_is_valid`] with the default configuration.
    ///
    /// # Errors
    ///
    /// As [`SchemaValidator::assert_is_valid`].
    pub fn validate(&self, instance: &Value) -> Result<(), SksError> {
        self.assert_is_valid(instance, self.config)
    }

    /// [`SchemaValidator::list_errors`] with the default configuration.
    ///
    /// # Errors
    ///
    /// As [`SchemaValidator::iter_errors`].
    pub fn errors(&self, instance: &Value) -> Result<ValidationErrors, SchemaError> {
        self.list_errors(instance, self.config)
    }
}

impl SchemaValidator for Validator {
    fn iter_errors(
        &self,
        instance: &Value,
        config: ValidatorConfig,
    ) -> Result<std::vec::IntoIter<ValidationError>, SchemaError> {
        let mut walker = Walker::new(&self.registry, &self.resolver, &self.patterns, config);
        let errors = walker.descend(instance, &self.schema)?;
        Ok(errors.into_iter())
    }
}

/// Builder for [`Validator`].
pub struct ValidatorOptions {
    draft: Draft,
    reset_uri: bool,
    fetcher: Option<Arc<dyn SchemaFetcher>>,
    registry: Option<Registry>,
    config: ValidatorConfig,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            draft: Draft::default(),
            reset_uri: false,
            fetcher: None,
            registry: None,
            config: ValidatorConfig::default(),
        }
    }
}

impl ValidatorOptions {
    /// Keyword set used when no explicit registry is supplied.
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = draft;
        self
    }

    /// Keep each fetched document's top-level `id` so it resets the
    /// resolution scope.
    pub fn reset_uri(mut self, reset_uri: bool) -> Self {
        self.reset_uri = reset_uri;
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl SchemaFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Replace the draft keyword set, e.g. with extra custom keywords.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build from an in-memory schema rooted at `base_uri`. The top-level
    /// `id` is stripped unless `reset_uri` is set.
    pub fn build(self, mut schema: Value, base_uri: Url) -> Validator {
        if !self.reset_uri {
            if let Value::Object(map) = &mut schema {
                map.remove("id");
            }
        }
        self.assemble(schema, base_uri)
    }

    /// Fetch and build the schema at `uri`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidUri`], then fetch and decoding failures.
    pub fn from_schema_uri(self, uri: &str) -> Result<Validator, SchemaError> {
        let base_uri = Url::parse(uri).map_err(|e| SchemaError::invalid_uri(uri, e))?;
        let fetcher = self.fetcher();
        let schema = load_document(fetcher.as_ref(), &base_uri, self.reset_uri)?;
        tracing::info!(
            uri = %base_uri,
            draft = ?self.draft,
            reset_uri = self.reset_uri,
            "built validator from schema URI"
        );
        Ok(Self {
            fetcher: Some(fetcher),
            ..self
        }
        .assemble(schema, base_uri))
    }

    /// Fetch and build the schema file at `path`.
    ///
    /// # Errors
    ///
    /// As [`Validator::from_schema_path`].
    pub fn from_schema_path(self, path: impl AsRef<Path>) -> Result<Validator, SchemaError> {
        let absolute = std::fs::canonicalize(path.as_ref())?;
        let uri = Url::from_file_path(&absolute).map_err(|()| SchemaError::Fetch {
            uri: absolute.display().to_string(),
            reason: "path cannot be expressed as a file URI".to_string(),
        })?;
        self.from_schema_uri(uri.as_str())
    }

    fn fetcher(&self) -> Arc<dyn SchemaFetcher> {
        match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(UriFetcher::new()),
        }
    }

    fn assemble(self, schema: Value, base_uri: Url) -> Validator {
        let schema = Arc::new(schema);
        let fetcher = self.fetcher();
        let resolver = Resolver::new(base_uri, Arc::clone(&schema), fetcher, self.reset_uri);
        let registry = self
            .registry
            .unwrap_or_else(|| Registry::for_draft(self.draft));
        Validator {
            schema,
            draft: self.draft,
            config: self.config,
            registry,
            resolver,
            patterns: PatternCache::new(),
        }
    }
}

/// The schema's absolute `id`, or [`DEFAULT_BASE_URI`].
///
/// # Errors
///
/// [`SchemaError::InvalidUri`] for an `id` that is neither absolute nor
/// joinable onto the default base.
pub fn base_uri_for(schema: &Value) -> Result<Url, SchemaError> {
    let default = Url::parse(DEFAULT_BASE_URI).map_err(|e| SchemaError::invalid_uri(DEFAULT_BASE_URI, e))?;
    match schema.get("id").and_then(Value::as_str) {
        Some(id) => default.join(id).map_err(|e| SchemaError::invalid_uri(id, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_uri_prefers_absolute_id() {
        let uri = base_uri_for(&json!({"id": "http://example.test/root.json"})).unwrap();
        assert_eq!(uri.as_str(), "http://example.test/root.json");
        assert_eq!(base_uri_for(&json!({})).unwrap().as_str(), DEFAULT_BASE_URI);
    }

    #[test]
    fn build_strips_id_unless_reset() {
        let schema = json!({"id": "http://example.test/root.json", "type": "object"});
        let base = Url::parse("http://example.test/root.json").unwrap();
        let stripped = Validator::options().build(schema.clone(), base.clone());
        assert!(stripped.schema().get("id").is_none());
        let kept = Validator::options().reset_uri(true).build(schema, base);
        assert!(kept.schema().get("id").is_some());
    }

    #[test]
    fn draft_selects_keyword_set() {
        let draft3 = Validator::options()
            .with_draft(Draft::Draft3)
            .build(json!({}), Url::parse(DEFAULT_BASE_URI).unwrap());
        assert!(draft3.registry().contains("disallow"));
        assert!(!draft3.registry().contains("allOf"));
    }

    #[test]
    fn validate_uses_default_config() {
        let schema = json!({"properties": {"a": {}}});
        let strict = Validator::new(schema.clone()).unwrap();
        assert!(strict.validate(&json!({"b": 1})).is_err());
        let permissive = Validator::options()
            .with_config(ValidatorConfig::permissive())
            .build(schema, Url::parse(DEFAULT_BASE_URI).unwrap());
        assert!(permissive.validate(&json!({"b": 1})).is_ok());
    }

    #[test]
    fn is_valid_matches_list_errors() {
        let validator = Validator::new(json!({"type": "string"})).unwrap();
        let config = ValidatorConfig::default();
        assert!(validator.is_valid(&json!("x"), config).unwrap());
        assert!(!validator.is_valid(&json!(1), config).unwrap());
        assert_eq!(validator.list_errors(&json!(1), config).unwrap().len(), 1);
    }
}
