//! MCP `memory_structure` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `memory_structure` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MemoryStructureParams {
    /// Only return one tier: `"hot"`, `"warm"`, `"cold"`, or `"archive"`.
    #[schemars(description = "Only return one tier: 'hot', 'warm', 'cold', or 'archive'")]
    pub tier: Option<String>,
}
