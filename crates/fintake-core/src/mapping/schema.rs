use crate::model::LineField;
use serde::{Deserialize, Serialize};

/// A keyword table mapping statement line descriptions to canonical fields.
///
/// Rules are evaluated in file order; the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub rules: Vec<LineRuleDef>,
}

/// A single line rule within a mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRuleDef {
    pub field: LineField,
    /// Substrings that select this rule (case- and accent-insensitive).
    pub aliases: Vec<String>,
    /// Substrings that veto this rule even when an alias matches.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub sign: SignPolicy,
    #[serde(default)]
    pub mode: WriteMode,
    #[serde(default)]
    pub note: Option<String>,
}

/// How the source sign is treated before storing a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignPolicy {
    #[default]
    AsIs,
    /// Stored as `-|v|`.
    Negative,
    /// Stored as `|v|`.
    Positive,
}

/// Whether matching rows add to the field or replace it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    #[default]
    Accumulate,
    Overwrite,
}
