//! # sks-schema: Strict JSON Schema Validation
//!
//! A Draft 4 (and Draft 3) JSON Schema validator with two departures from
//! stock behaviour:
//!
//! - **Scope-preserving `$ref`**: a fetched document's top-level `id` is
//!   dropped on load, so relative references inside it keep resolving
//!   against the scope chain of the referring schema. Set
//!   [`ValidatorOptions::reset_uri`] for standard resolution.
//! - **`banUnknownProperties`**: instance properties the applicable schema
//!   does not declare are errors, on by default per call
//!   ([`ValidatorConfig`]) and overridable per schema node. Across
//!   `allOf`/`anyOf` the declarations of all branches count together.
//!
//! ## Modules
//!
//! - [`fetch`]: `file://` and `http(s)://` document loading, JSON or YAML.
//! - [`resolver`]: scope stack, document cache, fragment lookup.
//! - [`registry`]: keyword name to validator function.
//! - [`keywords`]: the keyword validators.
//! - [`engine`]: the recursive walk.
//! - [`report`]: sorted error lists and the assert report.
//! - [`validator`]: [`Validator`], [`ValidatorOptions`], [`SchemaValidator`].
//!
//! [`ValidatorConfig`]: sks_core::ValidatorConfig

mod ban;
pub mod engine;
pub mod fetch;
pub mod keywords;
pub mod patterns;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod validator;

pub use engine::{ScopeGuard, Walker};
pub use fetch::{decode_document, SchemaFetcher, UriFetcher};
pub use registry::{KeywordFn, Registry};
pub use report::ValidationErrors;
pub use resolver::{load_document, ResolvedReference, Resolver, ScopeStack};
pub use validator::{SchemaValidator, Validator, ValidatorOptions, DEFAULT_BASE_URI};
