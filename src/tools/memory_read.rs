//! MCP `memory_read` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `memory_read` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MemoryReadParams {
    /// Path key as returned by `memory_structure` or `memory_search`.
    #[schemars(description = "Path of the memory file as returned by memory_structure or memory_search, e.g. '2026-01/2026-01-14.md' or 'MEMORY.md'")]
    pub path: String,
}
