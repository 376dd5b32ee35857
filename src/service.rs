//! Caller-facing API.
//!
//! Each call is an independent unit of work: it opens its own [`ChunkIndex`],
//! runs on the blocking pool, closes the index, and is bounded by
//! `service.operation_timeout_secs`. Calls share no mutable state and may run
//! concurrently.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::StrataConfig;
use crate::db::ChunkIndex;
use crate::error::{CoreError, Result};
use crate::memory::types::{MemoryStats, MemoryStructure, SearchResult};
use crate::memory::{search, stats, structure};
use crate::projection::{Projection, Projector};

#[derive(Clone)]
pub struct MemoryService {
    config: Arc<StrataConfig>,
}

impl MemoryService {
    pub fn new(config: StrataConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    /// Tiered view of the memory directory.
    pub async fn load_memory_structure(&self) -> Result<MemoryStructure> {
        self.run_blocking("load_memory_structure", |config, index| {
            structure::load_memory_structure(&config.resolved_memory_dir(), index, Utc::now())
        })
        .await
    }

    /// Full-text search with substring fallback. `None` uses the configured limit.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchResult>> {
        let query = query.to_string();
        let limit = limit.unwrap_or(self.config.search.default_limit);
        self.run_blocking("search", move |_, index| search::search(index, &query, limit))
            .await
    }

    pub async fn load_stats(&self) -> Result<MemoryStats> {
        self.run_blocking("load_stats", |config, index| {
            stats::memory_stats(&config.resolved_memory_dir(), index, Utc::now())
        })
        .await
    }

    /// 3-D projection of the stored embeddings.
    ///
    /// Cancelling `cancel` aborts the run with [`CoreError::Cancelled`]. When
    /// the deadline passes, the run is cancelled as well.
    pub async fn load_embeddings(&self, cancel: &CancellationToken) -> Result<Projection> {
        let projector = Projector::from_config(&self.config);
        let run_cancel = cancel.child_token();
        let result = self
            .with_deadline("load_embeddings", projector.project(&run_cancel))
            .await;
        if matches!(result, Err(CoreError::OperationTimedOut { .. })) {
            run_cancel.cancel();
        }
        result
    }

    /// Raw content of one memory file, addressed by its path key.
    pub async fn read_file(&self, path: &str) -> Result<String> {
        let path = path.to_string();
        self.run_blocking("read_file", move |config, _| {
            structure::read_memory_file(&config.resolved_memory_dir(), &path)
        })
        .await
    }

    fn open_index(config: &StrataConfig) -> ChunkIndex {
        ChunkIndex::new(config.resolved_db_path())
            .with_root_name(structure::root_name(&config.resolved_memory_dir()))
    }

    /// Run synchronous work on the blocking pool with a fresh index.
    async fn run_blocking<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&StrataConfig, &mut ChunkIndex) -> Result<T> + Send + 'static,
    {
        let config = Arc::clone(&self.config);
        let task = tokio::task::spawn_blocking(move || {
            let mut index = Self::open_index(&config);
            let result = work(&config, &mut index);
            index.close();
            result
        });

        self.with_deadline(operation, async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(CoreError::from_join_error(operation, e)),
            }
        })
        .await
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let seconds = self.config.service.operation_timeout_secs;
        if seconds == 0 {
            return work.await;
        }
        match tokio::time::timeout(Duration::from_secs(seconds), work).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, seconds, "operation timed out");
                Err(CoreError::OperationTimedOut { operation, seconds })
            }
        }
    }
}
