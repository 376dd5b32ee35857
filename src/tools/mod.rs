pub mod memory_embeddings;
pub mod memory_read;
pub mod memory_search;
pub mod memory_stats;
pub mod memory_structure;

use memory_embeddings::MemoryEmbeddingsParams;
use memory_read::MemoryReadParams;
use memory_search::MemorySearchParams;
use memory_stats::MemoryStatsParams;
use memory_structure::MemoryStructureParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use tokio_util::sync::CancellationToken;

use strata::memory::types::{MemoryStructure, Tier};
use strata::MemoryService;

/// The Strata MCP tool handler. Wraps a [`MemoryService`] and exposes each
/// caller-facing operation as a tool.
#[derive(Clone)]
pub struct StrataTools {
    tool_router: ToolRouter<Self>,
    service: MemoryService,
    shutdown: CancellationToken,
}

#[tool_router]
impl StrataTools {
    pub fn new(service: MemoryService, shutdown: CancellationToken) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service,
            shutdown,
        }
    }

    /// Tiered view of the memory directory.
    #[tool(description = "List memory files grouped by retention tier: hot (hub document and files from the last 7 days), warm and cold (folders), archive (quarterly rollups).")]
    async fn memory_structure(
        &self,
        Parameters(params): Parameters<MemoryStructureParams>,
    ) -> Result<String, String> {
        let tier = match params.tier.as_deref() {
            Some(t) => Some(t.parse::<Tier>()?),
            None => None,
        };
        tracing::info!(tier = ?tier, "memory_structure called");

        let structure = self
            .service
            .load_memory_structure()
            .await
            .map_err(|e| format!("structure failed: {e}"))?;

        let structure = match tier {
            Some(tier) => only_tier(structure, tier),
            None => structure,
        };
        serde_json::to_string(&structure).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Search indexed memory chunks.
    #[tool(description = "Search memory chunks by keyword. Returns snippets with file path and line range; exact word-prefix matches score 0.9, substring matches 0.7.")]
    async fn memory_search(
        &self,
        Parameters(params): Parameters<MemorySearchParams>,
    ) -> Result<String, String> {
        tracing::info!(query = %params.query, limit = ?params.limit, "memory_search called");

        let results = self
            .service
            .search(&params.query, params.limit)
            .await
            .map_err(|e| format!("search failed: {e}"))?;

        serde_json::to_string(&serde_json::json!({
            "results": results,
            "total": results.len(),
        }))
        .map_err(|e| format!("serialization failed: {e}"))
    }

    /// Aggregate statistics.
    #[tool(description = "Get memory statistics: file counts per tier, token estimate, chunk and indexed-file counts, store size.")]
    async fn memory_stats(
        &self,
        Parameters(_params): Parameters<MemoryStatsParams>,
    ) -> Result<String, String> {
        tracing::info!("memory_stats called");
        let stats = self
            .service
            .load_stats()
            .await
            .map_err(|e| format!("stats failed: {e}"))?;
        serde_json::to_string(&stats).map_err(|e| format!("serialization failed: {e}"))
    }

    /// 3-D layout of chunk embeddings.
    #[tool(description = "Project chunk embeddings to 3-D coordinates with each chunk's tier and similarity (0-1) to the MEMORY.md hub document.")]
    async fn memory_embeddings(
        &self,
        Parameters(params): Parameters<MemoryEmbeddingsParams>,
    ) -> Result<String, String> {
        let include_text = params.include_text.unwrap_or(false);
        tracing::info!(include_text, "memory_embeddings called");

        let projection = self
            .service
            .load_embeddings(&self.shutdown)
            .await
            .map_err(|e| format!("projection failed: {e}"))?;

        let strategy = projection.strategy();
        let mut points = projection.into_points();
        if !include_text {
            for point in &mut points {
                point.text.clear();
            }
        }

        serde_json::to_string(&serde_json::json!({
            "strategy": strategy,
            "points": points,
        }))
        .map_err(|e| format!("serialization failed: {e}"))
    }

    /// Read one memory file.
    #[tool(description = "Read the full content of one memory file by its path.")]
    async fn memory_read(
        &self,
        Parameters(params): Parameters<MemoryReadParams>,
    ) -> Result<String, String> {
        tracing::info!(path = %params.path, "memory_read called");
        self.service
            .read_file(&params.path)
            .await
            .map_err(|e| format!("read failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for StrataTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Strata is a read-only view of an agent's memory. Use memory_structure to browse \
                 tiers, memory_search to find chunks, and memory_read to open a file."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

/// Empty every tier except `tier`.
fn only_tier(structure: MemoryStructure, tier: Tier) -> MemoryStructure {
    MemoryStructure {
        hot: if tier == Tier::Hot { structure.hot } else { Vec::new() },
        warm: if tier == Tier::Warm { structure.warm } else { Vec::new() },
        cold: if tier == Tier::Cold { structure.cold } else { Vec::new() },
        archive: if tier == Tier::Archive {
            structure.archive
        } else {
            Vec::new()
        },
    }
}
