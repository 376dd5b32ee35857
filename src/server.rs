//! MCP server initialization for the stdio transport.

use crate::tools::StrataTools;
use anyhow::Result;
use rmcp::ServiceExt;
use strata::config::StrataConfig;
use strata::MemoryService;
use tokio_util::sync::CancellationToken;

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: StrataConfig) -> Result<()> {
    tracing::info!(
        memory_dir = %config.resolved_memory_dir().display(),
        db = %config.resolved_db_path().display(),
        "starting Strata MCP server on stdio"
    );

    if !config.resolved_memory_dir().is_dir() {
        tracing::warn!("memory directory does not exist yet; structure requests will fail until it does");
    }

    let shutdown = CancellationToken::new();
    let tools = StrataTools::new(MemoryService::new(config), shutdown.clone());
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    shutdown.cancel();
    tracing::info!("MCP server shut down");

    Ok(())
}
