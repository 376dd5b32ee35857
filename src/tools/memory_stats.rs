//! MCP `memory_stats` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `memory_stats` MCP tool. Takes no arguments.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MemoryStatsParams {}
