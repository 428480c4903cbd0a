//! Entries in the generated tool registry.

use serde::{Deserialize, Serialize};

/// One catalog entry, as emitted by the registry build step. The server
/// treats `category` and `kind` as opaque labels; the build step owns the
/// closed lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    pub date_added: String,
    pub version: String,
    #[serde(default)]
    pub files: Vec<String>,
}
