//! Memory tiering, search, and embedding projection for an agent's memory store.
//!
//! Strata is a read-only analytical layer over two things an agent leaves
//! behind: a directory of markdown/JSON memory files, and the SQLite chunk
//! store its indexer builds from them. It answers four questions:
//!
//! | Operation | Answer |
//! |-----------|--------|
//! | **Structure** | Which files are hot, warm, cold, or archived |
//! | **Search** | Which chunks mention a query (FTS5 prefix match, substring fallback) |
//! | **Stats** | How much is on disk and how much of it is indexed |
//! | **Embeddings** | Where each chunk sits in 3-D, and how close it is to the hub document |
//!
//! # Tiers
//!
//! | Tier | Rule |
//! |------|------|
//! | **Hot** | The hub document `MEMORY.md`, or a root-level file touched within 7 days |
//! | **Warm** | Everything else outside the archive |
//! | **Cold** | Files under `archive/` that are not quarterly rollups |
//! | **Archive** | Quarterly rollups (`-Q1`..`-Q4`) under `archive/` |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: Read-only access to the chunk store
//! - [`memory`]: Tier classification, directory structure, search, and stats
//! - [`projection`]: Hub similarity, power-iteration PCA, and the external reducer
//! - [`service`]: The caller-facing API
//! - [`error`]: Typed failure conditions

pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod projection;
pub mod service;

pub use error::{CoreError, Result};
pub use service::MemoryService;
