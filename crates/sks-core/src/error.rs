//! # Error Types: Structural Failures and Aggregate Verdicts
//!
//! Two failure families exist and they never mix:
//!
//! - **Structural** ([`SchemaError`]): the schema or one of its referenced
//!   documents cannot be fetched, decoded, or interpreted. These abort the
//!   current load or validation call.
//! - **Aggregate** ([`ValidationFailed`]): the instance violated one or more
//!   constraints. Individual violations are values, not errors; only the
//!   assertion entry point turns a non-empty set into a failure.

use thiserror::Error;

/// Top-level error type returned by assertion entry points.
#[derive(Error, Debug)]
pub enum SksError {
    /// The schema could not be loaded or interpreted.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The instance is invalid.
    #[error(transparent)]
    Invalid(#[from] ValidationFailed),
}

/// A structural failure: malformed documents, unreachable URIs, and
/// schema-authoring mistakes.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document at `uri` could not be retrieved.
    #[error("cannot fetch '{uri}': {reason}")]
    Fetch {
        /// The URI that was requested.
        uri: String,
        /// Transport-level reason.
        reason: String,
    },

    /// No fetcher knows how to retrieve this URI scheme.
    #[error("unsupported URI scheme for '{uri}'")]
    UnsupportedScheme {
        /// The URI that was requested.
        uri: String,
    },

    /// The document at `uri` is not valid JSON.
    #[error("malformed JSON in '{uri}': {source}")]
    MalformedJson {
        /// The URI of the document.
        uri: String,
        /// Parser error.
        source: serde_json::Error,
    },

    /// The document at `uri` is not valid YAML, or has no JSON equivalent.
    #[error("malformed YAML in '{uri}': {reason}")]
    MalformedYaml {
        /// The URI of the document.
        uri: String,
        /// Parser or conversion error.
        reason: String,
    },

    /// A base URI or scope could not be parsed.
    #[error("invalid URI '{uri}': {source}")]
    InvalidUri {
        /// The offending text.
        uri: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// A `$ref` value could not be interpreted against the current scope.
    #[error("invalid reference '{reference}': {reason}")]
    InvalidReference {
        /// The `$ref` value.
        reference: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The JSON pointer fragment of a reference points at nothing.
    #[error("unresolvable JSON pointer: '{fragment}' in '{uri}'")]
    UnresolvableFragment {
        /// Document URI (without fragment).
        uri: String,
        /// Decoded fragment.
        fragment: String,
    },

    /// A `pattern` or `patternProperties` key is not a valid regex.
    #[error("invalid regex '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Compiler error.
        reason: String,
    },

    /// A `type` keyword names a type this draft does not know.
    #[error("unknown type '{name}'")]
    UnknownType {
        /// The type name.
        name: String,
    },

    /// IO error reading a local document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Build an [`SchemaError::InvalidUri`] for `uri`.
    pub fn invalid_uri(uri: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            source,
        }
    }
}

/// Raised by `assert_is_valid` when at least one violation was collected.
///
/// `report` holds one block per violation, in sorted order, each with the
/// message, the dot-joined instance path and the offending instance value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("jsonschema validation failed with {count} errors:{report}")]
pub struct ValidationFailed {
    /// Number of violations.
    pub count: usize,
    /// Concatenated per-violation blocks.
    pub report: String,
}
