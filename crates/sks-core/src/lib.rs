//! # sks-core: Foundational Types for strict-schema
//!
//! Leaf crate of the workspace. It defines what the validation engine
//! produces and consumes without knowing how validation runs:
//!
//! - [`error`]: structural failures ([`SchemaError`]) and the aggregate
//!   verdict ([`ValidationFailed`]).
//! - [`violation`]: [`ValidationError`], one failed constraint occurrence.
//! - [`path`]: root-to-leaf instance and schema paths.
//! - [`json`]: variant-based type predicates and numeric-aware equality.
//! - [`config`]: per-call [`ValidatorConfig`] and [`Draft`] selection.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sks-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod json;
pub mod path;
pub mod violation;

pub use config::{Draft, ValidatorConfig, BAN_UNKNOWN_PROPERTIES};
pub use error::{SchemaError, SksError, ValidationFailed};
pub use path::{JsonPath, PathChunk};
pub use violation::ValidationError;
