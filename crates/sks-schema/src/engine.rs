//! # Validation Engine
//!
//! [`Walker`] performs one validation call: it walks `(schema, instance)`
//! pairs, dispatches keywords through the [`Registry`], follows `$ref`
//! through the [`Resolver`], and applies the `banUnknownProperties` policy.
//!
//! ## Per-node algorithm
//!
//! 1. A node declaring `id` pushes that scope for its whole subtree.
//! 2. The node's effective ban flag is its own `banUnknownProperties` if
//!    present, else an override handed down by an enclosing `allOf`/`anyOf`
//!    (or carried through a `$ref` from one), else the inherited flag.
//! 3. With the ban on and a non-empty `allOf`/`anyOf`, unknown properties
//!    are checked against the union of the branches' declarations, and the
//!    branches themselves are validated with the ban off.
//! 4. `$ref` short-circuits every sibling keyword.
//! 5. Otherwise, unless step 3 ran, the plain-object ban runs.
//! 6. Every other registered keyword runs; its errors get the keyword name,
//!    value, instance and schema back-filled and the keyword prepended to
//!    the schema path (except for `$ref`).
//!
//! Scope pushes and per-node state are released by [`ScopeGuard`] on every
//! exit path, including `?` propagation.
//!
//! A `$ref` that is re-entered for the same instance value while it is
//! still being followed is a reference cycle and fails with
//! [`SchemaError::InvalidReference`].

use std::ops::{Deref, DerefMut};

use regex::Regex;
use serde_json::{Map, Value};
use sks_core::{PathChunk, SchemaError, ValidationError, ValidatorConfig, BAN_UNKNOWN_PROPERTIES};
use url::Url;

use crate::ban;
use crate::patterns::PatternCache;
use crate::registry::Registry;
use crate::resolver::{ResolvedReference, Resolver, ScopeStack};

const COMBINATORS: [&str; 2] = ["allOf", "anyOf"];
const REF: &str = "$ref";

/// Ban state of the schema node currently being validated.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Flag inherited by child schemas.
    ban: bool,
    /// Override a `$ref` at this node forwards to its target.
    ref_override: Option<bool>,
    /// `allOf`/`anyOf` branches at this node are validated with the ban off.
    suppress_branch_ban: bool,
}

/// State of one validation call.
pub struct Walker<'v> {
    registry: &'v Registry,
    resolver: &'v Resolver,
    patterns: &'v PatternCache,
    scopes: ScopeStack,
    frame: Frame,
    /// `(target URI, instance address)` of every `$ref` being followed.
    following: Vec<(String, usize)>,
}

impl<'v> Walker<'v> {
    pub(crate) fn new(
        registry: &'v Registry,
        resolver: &'v Resolver,
        patterns: &'v PatternCache,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            patterns,
            scopes: resolver.scopes(),
            frame: Frame {
                ban: config.ban_unknown_properties,
                ref_override: None,
                suppress_branch_ban: false,
            },
            following: Vec::new(),
        }
    }

    /// Validate `instance` against `schema`, inheriting the current ban flag.
    ///
    /// # Errors
    ///
    /// Structural failures only; constraint failures are in the `Ok` vector.
    pub fn descend(
        &mut self,
        instance: &Value,
        schema: &Value,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        self.descend_node(instance, schema, None)
    }

    /// [`descend`](Self::descend), then prepend `path` to each error's
    /// instance path and `schema_path` to its schema path.
    ///
    /// # Errors
    ///
    /// As [`descend`](Self::descend).
    pub fn descend_at(
        &mut self,
        instance: &Value,
        schema: &Value,
        path: Option<PathChunk>,
        schema_path: Option<PathChunk>,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        let errors = self.descend(instance, schema)?;
        Ok(prefixed(errors, path, schema_path))
    }

    /// Validate one `allOf`/`anyOf` branch, switching the ban off for the
    /// branch node when the enclosing node ran the union check.
    pub(crate) fn descend_branch(
        &mut self,
        instance: &Value,
        schema: &Value,
        index: usize,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        let ban_override = self.frame.suppress_branch_ban.then_some(false);
        let errors = self.descend_node(instance, schema, ban_override)?;
        Ok(prefixed(errors, None, Some(PathChunk::Index(index))))
    }

    /// Validate the target of a resolved `$ref` with its URI as the scope,
    /// forwarding any branch override the referring node received.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidReference`] when the same target is already
    /// being followed for this instance, plus anything the target raises.
    pub(crate) fn follow_reference(
        &mut self,
        reference: &str,
        resolved: &ResolvedReference,
        instance: &Value,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        let key = (resolved.uri.to_string(), instance as *const Value as usize);
        if self.following.contains(&key) {
            tracing::warn!(reference, uri = %resolved.uri, "reference cycle");
            return Err(SchemaError::InvalidReference {
                reference: reference.to_string(),
                reason: "reference cycle".to_string(),
            });
        }

        self.following.push(key);
        let ban_override = self.frame.ref_override;
        let result = {
            let mut scoped = self.enter_scope(resolved.uri.clone());
            scoped.descend_node(instance, &resolved.schema, ban_override)
        };
        self.following.pop();
        result
    }

    /// Whether `instance` is valid under `schema`.
    ///
    /// # Errors
    ///
    /// As [`descend`](Self::descend).
    pub fn is_valid(&mut self, instance: &Value, schema: &Value) -> Result<bool, SchemaError> {
        Ok(self.descend(instance, schema)?.is_empty())
    }

    /// Resolve `reference` against the current scope.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn resolve(&self, reference: &str) -> Result<ResolvedReference, SchemaError> {
        self.resolver.resolve(reference, &self.scopes)
    }

    /// Compiled form of `pattern`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidPattern`].
    pub fn regex(&self, pattern: &str) -> Result<Regex, SchemaError> {
        self.patterns.get(pattern)
    }

    /// The ban flag children of the current node inherit.
    pub fn ban_enabled(&self) -> bool {
        self.frame.ban
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// Push `uri` as the resolution scope until the guard drops.
    pub fn enter_scope(&mut self, uri: Url) -> ScopeGuard<'_, 'v> {
        self.scopes.push_uri(uri);
        ScopeGuard {
            walker: self,
            pushed: true,
            saved: None,
        }
    }

    fn enter_node(&mut self, scope: Option<Url>, frame: Frame) -> ScopeGuard<'_, 'v> {
        let pushed = match scope {
            Some(uri) => {
                self.scopes.push_uri(uri);
                true
            }
            None => false,
        };
        let saved = std::mem::replace(&mut self.frame, frame);
        ScopeGuard {
            walker: self,
            pushed,
            saved: Some(saved),
        }
    }

    fn descend_node(
        &mut self,
        instance: &Value,
        schema: &Value,
        ban_override: Option<bool>,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        let Value::Object(map) = schema else {
            return Ok(Vec::new());
        };

        let scope = match map.get("id").and_then(Value::as_str) {
            Some(id) => Some(
                self.scopes
                    .current()
                    .join(id)
                    .map_err(|e| SchemaError::invalid_uri(id, e))?,
            ),
            None => None,
        };

        let explicit = map.get(BAN_UNKNOWN_PROPERTIES).and_then(Value::as_bool);
        let inherited = self.frame.ban;
        let effective = explicit.or(ban_override).unwrap_or(inherited);
        let frame = Frame {
            ban: explicit.unwrap_or(inherited),
            ref_override: if explicit.is_some() { None } else { ban_override },
            suppress_branch_ban: false,
        };

        let mut node = self.enter_node(scope, frame);
        node.validate_object(instance, schema, map, effective)
    }

    fn validate_object(
        &mut self,
        instance: &Value,
        schema: &Value,
        map: &Map<String, Value>,
        effective: bool,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        let mut errors = Vec::new();

        let mut combinator_ban = false;
        if effective {
            for keyword in COMBINATORS {
                let Some(Value::Array(branches)) = map.get(keyword) else {
                    continue;
                };
                if branches.is_empty() {
                    continue;
                }
                combinator_ban = true;
                errors.extend(ban::ban_unknown_in_branches(self, effective, instance, branches)?);
            }
        }
        self.frame.suppress_branch_ban = combinator_ban;

        if let Some(reference) = map.get(REF) {
            errors.extend(self.apply_keyword(REF, reference, instance, schema, map)?);
            return Ok(errors);
        }

        if !combinator_ban {
            let value = Value::Bool(effective);
            errors.extend(self.apply_keyword(BAN_UNKNOWN_PROPERTIES, &value, instance, schema, map)?);
        }

        for (keyword, value) in map {
            if keyword == BAN_UNKNOWN_PROPERTIES {
                continue;
            }
            errors.extend(self.apply_keyword(keyword, value, instance, schema, map)?);
        }
        Ok(errors)
    }

    fn apply_keyword(
        &mut self,
        keyword: &str,
        value: &Value,
        instance: &Value,
        schema: &Value,
        map: &Map<String, Value>,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        let Some(validate) = self.registry.lookup(keyword) else {
            return Ok(Vec::new());
        };
        let mut errors = validate(self, value, instance, map)?;
        for error in &mut errors {
            error.fill(keyword, value, instance, schema);
            if keyword != REF {
                error.prepend_schema_path(keyword);
            }
        }
        Ok(errors)
    }
}

/// Releases a pushed scope (and restores per-node state) when dropped.
pub struct ScopeGuard<'w, 'v> {
    walker: &'w mut Walker<'v>,
    pushed: bool,
    saved: Option<Frame>,
}

impl<'v> Deref for ScopeGuard<'_, 'v> {
    type Target = Walker<'v>;

    fn deref(&self) -> &Self::Target {
        self.walker
    }
}

impl DerefMut for ScopeGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.walker
    }
}

impl Drop for ScopeGuard<'_, '_> {
    fn drop(&mut self) {
        if self.pushed {
            self.walker.scopes.pop();
        }
        if let Some(frame) = self.saved.take() {
            self.walker.frame = frame;
        }
    }
}

fn prefixed(
    mut errors: Vec<ValidationError>,
    path: Option<PathChunk>,
    schema_path: Option<PathChunk>,
) -> Vec<ValidationError> {
    for error in &mut errors {
        if let Some(chunk) = &path {
            error.prepend_path(chunk.clone());
        }
        if let Some(chunk) = &schema_path {
            error.prepend_schema_path(chunk.clone());
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SchemaFetcher;
    use serde_json::json;
    use std::sync::Arc;

    struct NoFetch;

    impl SchemaFetcher for NoFetch {
        fn fetch(&self, uri: &Url) -> Result<Vec<u8>, SchemaError> {
            Err(SchemaError::Fetch {
                uri: uri.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    fn parts(root: Value) -> (Registry, Resolver, PatternCache) {
        let base = Url::parse("http://schemas.test/root.json").unwrap();
        let resolver = Resolver::new(base, Arc::new(root), Arc::new(NoFetch), false);
        (Registry::draft4(), resolver, PatternCache::new())
    }

    #[test]
    fn scope_stack_is_balanced_after_nested_ids() {
        let schema = json!({
            "id": "http://schemas.test/a/",
            "properties": {"x": {"id": "b/", "type": "string"}}
        });
        let (registry, resolver, patterns) = parts(schema.clone());
        let mut walker = Walker::new(&registry, &resolver, &patterns, ValidatorConfig::default());
        let errors = walker.descend(&json!({"x": 1}), &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(walker.scopes().depth(), 0);
    }

    #[test]
    fn scope_stack_is_balanced_after_structural_error() {
        let schema = json!({
            "id": "http://schemas.test/a/",
            "properties": {"x": {"$ref": "http://offline.test/x.json"}}
        });
        let (registry, resolver, patterns) = parts(schema.clone());
        let mut walker = Walker::new(&registry, &resolver, &patterns, ValidatorConfig::default());
        let err = walker.descend(&json!({"x": 1}), &schema).unwrap_err();
        assert!(matches!(err, SchemaError::Fetch { .. }));
        assert_eq!(walker.scopes().depth(), 0);
        assert!(walker.ban_enabled());
    }

    #[test]
    fn ref_short_circuits_siblings() {
        let schema = json!({
            "definitions": {"s": {"type": "string"}},
            "properties": {"x": {"$ref": "#/definitions/s", "type": "integer"}}
        });
        let (registry, resolver, patterns) = parts(schema.clone());
        let mut walker = Walker::new(&registry, &resolver, &patterns, ValidatorConfig::permissive());
        assert!(walker.is_valid(&json!({"x": "text"}), &schema).unwrap());
        let errors = walker.descend(&json!({"x": 5}), &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].validator(), Some("type"));
        assert_eq!(errors[0].schema_path().dotted(), "properties.x.type");
    }

    #[test]
    fn reference_cycle_is_structural_and_leaves_walker_clean() {
        let schema = json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/a"}
            },
            "properties": {"x": {"$ref": "#/definitions/a"}}
        });
        let (registry, resolver, patterns) = parts(schema.clone());
        let mut walker = Walker::new(&registry, &resolver, &patterns, ValidatorConfig::default());
        let err = walker.descend(&json!({"x": 1}), &schema).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidReference { ref reason, .. } if reason == "reference cycle"));
        assert_eq!(walker.scopes().depth(), 0);
        assert!(walker.following.is_empty());
    }

    #[test]
    fn non_object_schema_accepts_everything() {
        let (registry, resolver, patterns) = parts(json!({}));
        let mut walker = Walker::new(&registry, &resolver, &patterns, ValidatorConfig::default());
        assert!(walker.is_valid(&json!([1, 2]), &json!(true)).unwrap());
    }
}
