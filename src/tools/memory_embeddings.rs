//! MCP `memory_embeddings` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MemoryEmbeddingsParams {
    /// Include the first 200 characters of each chunk. Defaults to false.
    #[schemars(description = "Include the first 200 characters of each chunk's text. Defaults to false to keep the response small.")]
    pub include_text: Option<bool>,
}
