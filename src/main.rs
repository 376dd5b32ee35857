mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use strata::config::StrataConfig;
use strata::MemoryService;

#[derive(Parser)]
#[command(name = "strata", version, about = "Tiered view, search and 3-D map of an agent's memory")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio transport)
    Serve,
    /// Show memory files grouped by tier
    Structure {
        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Search indexed memory chunks
    Search {
        query: String,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show memory statistics
    Stats,
    /// Project chunk embeddings to 3-D
    Embeddings {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print one memory file
    Show { path: String },
    /// Check the memory directory, chunk store and reducer
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = StrataConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC and JSON output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve_stdio(config).await?,
        Command::Doctor => cli::doctor::doctor(&config)?,
        command => {
            let service = MemoryService::new(config);
            match command {
                Command::Structure { json } => cli::structure::structure(&service, json).await?,
                Command::Search { query, limit } => {
                    cli::search::search(&service, &query, limit).await?
                }
                Command::Stats => cli::stats::stats(&service).await?,
                Command::Embeddings { json } => {
                    cli::embeddings::embeddings(&service, json).await?
                }
                Command::Show { path } => cli::show::show(&service, &path).await?,
                Command::Serve | Command::Doctor => unreachable!("handled above"),
            }
        }
    }

    Ok(())
}
