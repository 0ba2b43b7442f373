//! # Validator Configuration
//!
//! [`ValidatorConfig`] is the per-call knob set; [`Draft`] selects the
//! keyword vocabulary a validator is built with. Both deserialize from the
//! camelCase / lowercase spellings used in settings files.

use serde::{Deserialize, Serialize};

/// Name of the extension keyword that forbids undeclared properties.
pub const BAN_UNKNOWN_PROPERTIES: &str = "banUnknownProperties";

/// Per-call validation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Enforce the unknown-properties ban wherever a schema node does not
    /// set `banUnknownProperties` itself.
    pub ban_unknown_properties: bool,
}

impl ValidatorConfig {
    /// Standard JSON Schema behaviour: the ban is off unless a schema node
    /// opts in explicitly.
    pub fn permissive() -> Self {
        Self {
            ban_unknown_properties: false,
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            ban_unknown_properties: true,
        }
    }
}

/// JSON Schema draft whose keyword set a validator uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Draft {
    /// Draft 3.
    Draft3,
    /// Draft 4.
    #[default]
    Draft4,
}
