//! MCP `memory_search` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `memory_search` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MemorySearchParams {
    /// Free-text query. Each word is matched as a prefix.
    #[schemars(description = "Free-text query. Each word is matched as a prefix; substring matches fill in when few full-text hits exist.")]
    pub query: String,

    /// Maximum number of results. Defaults to the configured search limit.
    #[schemars(description = "Maximum number of results to return. Defaults to 20.")]
    pub limit: Option<usize>,
}
