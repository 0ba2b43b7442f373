//! # Scope Resolution
//!
//! Resolves `$ref` values against a stack of base URIs and caches every
//! fetched document by URI for the lifetime of the [`Resolver`].
//!
//! ## Scope Reset Suppression
//!
//! Standard resolvers switch the resolution scope to a fetched document's
//! own `id` once a remote reference is followed, so relative references
//! inside that document resolve against wherever its author claimed it
//! lives. By default this resolver strips the top-level `id` of every
//! document it loads, before caching, so relative references keep
//! resolving against the URI the document was actually reached through.
//! Building with `reset_uri = true` keeps the `id` and restores the
//! standard behaviour.
//!
//! The strip is part of loading: it happens on the freshly decoded value
//! before anything else can observe it, and cached documents are never
//! mutated afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use percent_encoding::percent_decode_str;
use serde_json::Value;
use sks_core::SchemaError;
use url::Url;

use crate::fetch::{decode_document, SchemaFetcher};

/// Stack of base URIs for resolving relative references.
///
/// The base URI sits at the bottom and is never popped.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    base: Url,
    pushed: Vec<Url>,
}

impl ScopeStack {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            pushed: Vec::new(),
        }
    }

    /// The scope relative references resolve against.
    pub fn current(&self) -> &Url {
        self.pushed.last().unwrap_or(&self.base)
    }

    /// Push `scope`, joined against the current scope.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidUri`] if the join fails.
    pub fn push(&mut self, scope: &str) -> Result<(), SchemaError> {
        let uri = self
            .current()
            .join(scope)
            .map_err(|e| SchemaError::invalid_uri(scope, e))?;
        self.push_uri(uri);
        Ok(())
    }

    /// Push an already-resolved scope.
    pub fn push_uri(&mut self, uri: Url) {
        tracing::trace!(scope = %uri, depth = self.pushed.len() + 1, "push scope");
        self.pushed.push(uri);
    }

    /// Pop the innermost pushed scope. The base is never popped.
    pub fn pop(&mut self) -> Option<Url> {
        let popped = self.pushed.pop();
        if let Some(uri) = &popped {
            tracing::trace!(scope = %uri, depth = self.pushed.len(), "pop scope");
        }
        popped
    }

    /// Number of scopes pushed above the base.
    pub fn depth(&self) -> usize {
        self.pushed.len()
    }
}

/// The target of a followed reference.
#[derive(Debug, Clone)]
pub struct ResolvedReference {
    /// Absolute URI of the target, fragment included.
    pub uri: Url,
    /// The (sub)schema the fragment points at.
    pub schema: Arc<Value>,
}

/// Fetch, decode and (unless `reset_uri`) strip the top-level `id` of the
/// document at `uri`.
///
/// # Errors
///
/// Fetch failures and decoding failures, unchanged.
pub fn load_document(
    fetcher: &dyn SchemaFetcher,
    uri: &Url,
    reset_uri: bool,
) -> Result<Value, SchemaError> {
    let bytes = fetcher.fetch(uri)?;
    tracing::debug!(uri = %uri, bytes = bytes.len(), "fetched schema document");
    let mut document = decode_document(uri, &bytes)?;
    if !reset_uri {
        if let Value::Object(map) = &mut document {
            map.remove("id");
        }
    }
    Ok(document)
}

/// Resolves references and owns the document cache.
///
/// Safe to share across threads; the scope stack is not part of it and
/// belongs to each validation call.
pub struct Resolver {
    base_uri: Url,
    reset_uri: bool,
    fetcher: Arc<dyn SchemaFetcher>,
    documents: RwLock<HashMap<String, Arc<Value>>>,
    fragments: RwLock<HashMap<String, Arc<Value>>>,
    /// One lock per document URI, held while that document is fetched.
    loading: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("base_uri", &self.base_uri.as_str())
            .field("reset_uri", &self.reset_uri)
            .field("documents", &self.documents.read().len())
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// A resolver rooted at `base_uri`, with `root` pre-cached there.
    ///
    /// When `reset_uri` is set and the root declares an `id`, the root is
    /// also cached under that `id`.
    pub fn new(
        base_uri: Url,
        root: Arc<Value>,
        fetcher: Arc<dyn SchemaFetcher>,
        reset_uri: bool,
    ) -> Self {
        let mut documents = HashMap::new();
        if reset_uri {
            if let Some(id) = root.get("id").and_then(Value::as_str) {
                if let Ok(id_uri) = base_uri.join(id) {
                    documents.insert(document_key(&id_uri), Arc::clone(&root));
                }
            }
        }
        documents.insert(document_key(&base_uri), root);
        Self {
            base_uri,
            reset_uri,
            fetcher,
            documents: RwLock::new(documents),
            fragments: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn reset_uri(&self) -> bool {
        self.reset_uri
    }

    /// Fresh scope stack rooted at the base URI.
    pub fn scopes(&self) -> ScopeStack {
        ScopeStack::new(self.base_uri.clone())
    }

    /// Number of distinct documents currently cached.
    pub fn cached_documents(&self) -> usize {
        self.documents.read().len()
    }

    /// Load the document at `uri` with this resolver's fetcher and `id`
    /// rule, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Fetch failures and decoding failures.
    pub fn load(&self, uri: &Url) -> Result<Value, SchemaError> {
        load_document(self.fetcher.as_ref(), uri, self.reset_uri)
    }

    /// Resolve `reference` against the innermost scope of `scopes`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidReference`] if the reference cannot be joined,
    /// fetch/decoding failures for uncached documents, and
    /// [`SchemaError::UnresolvableFragment`] if the pointer leads nowhere.
    pub fn resolve(
        &self,
        reference: &str,
        scopes: &ScopeStack,
    ) -> Result<ResolvedReference, SchemaError> {
        let uri = scopes
            .current()
            .join(reference)
            .map_err(|e| SchemaError::InvalidReference {
                reference: reference.to_string(),
                reason: e.to_string(),
            })?;
        let schema = self.resolve_uri(&uri)?;
        Ok(ResolvedReference { uri, schema })
    }

    /// Resolve an absolute URI, following its fragment as a JSON pointer.
    ///
    /// # Errors
    ///
    /// As [`Resolver::resolve`].
    pub fn resolve_uri(&self, uri: &Url) -> Result<Arc<Value>, SchemaError> {
        let document = self.document(uri)?;
        let fragment = uri
            .fragment()
            .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        let pointer = fragment.trim_start_matches('/');
        if pointer.is_empty() {
            return Ok(document);
        }

        let key = uri.to_string();
        if let Some(hit) = self.fragments.read().get(&key) {
            return Ok(Arc::clone(hit));
        }
        let target = document
            .pointer(&format!("/{pointer}"))
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| SchemaError::UnresolvableFragment {
                uri: document_key(uri),
                fragment: fragment.clone(),
            })?;
        self.fragments.write().insert(key, Arc::clone(&target));
        Ok(target)
    }

    fn document(&self, uri: &Url) -> Result<Arc<Value>, SchemaError> {
        let key = document_key(uri);
        if let Some(hit) = self.documents.read().get(&key) {
            return Ok(Arc::clone(hit));
        }

        // Only callers wanting this same URI wait on the fetch; the document
        // map stays readable throughout.
        let slot = Arc::clone(self.loading.lock().entry(key.clone()).or_default());
        let _loading = slot.lock();
        if let Some(hit) = self.documents.read().get(&key) {
            return Ok(Arc::clone(hit));
        }
        let mut bare = uri.clone();
        bare.set_fragment(None);
        let document = Arc::new(self.load(&bare)?);
        let cached = Arc::clone(self.documents.write().entry(key).or_insert(document));
        Ok(cached)
    }
}

fn document_key(uri: &Url) -> String {
    let mut bare = uri.clone();
    bare.set_fragment(None);
    bare.to_string()
}
