//! 3-D projection of chunk embeddings for visualization.
//!
//! [`Projector::project`] first offers the store to an optional external
//! reducer; when that is unavailable or fails it runs the in-process pipeline:
//! load chunks, score them against the hub document, reduce with
//! power-iteration PCA, and attach tier metadata.

pub mod pca;
pub mod reducer;
pub mod similarity;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::config::{ReducerConfig, StrataConfig};
use crate::db::{index::DEFAULT_CHUNK_LIMIT, Chunk, ChunkIndex};
use crate::error::{CoreError, Result};
use crate::memory::paths;
use crate::memory::structure::{resolve_file, root_name};
use crate::memory::tier::classify;
use crate::memory::types::EmbeddingPoint;

/// Characters of chunk text carried on each point.
pub const POINT_TEXT_CHARS: usize = 200;

/// Which strategy produced a projection.
#[derive(Debug, Clone)]
pub enum Projection {
    External(Vec<EmbeddingPoint>),
    Fallback(Vec<EmbeddingPoint>),
}

impl Projection {
    pub fn points(&self) -> &[EmbeddingPoint] {
        match self {
            Self::External(points) | Self::Fallback(points) => points,
        }
    }

    pub fn into_points(self) -> Vec<EmbeddingPoint> {
        match self {
            Self::External(points) | Self::Fallback(points) => points,
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Self::External(_) => "external",
            Self::Fallback(_) => "fallback",
        }
    }
}

pub struct Projector {
    memory_dir: PathBuf,
    db_path: PathBuf,
    reducer: ReducerConfig,
    max_chunks: usize,
}

impl Projector {
    /// Projector with the external reducer disabled.
    pub fn new(memory_dir: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            memory_dir: memory_dir.into(),
            db_path: db_path.into(),
            reducer: ReducerConfig {
                enabled: false,
                ..ReducerConfig::default()
            },
            max_chunks: DEFAULT_CHUNK_LIMIT,
        }
    }

    pub fn from_config(config: &StrataConfig) -> Self {
        Self::new(config.resolved_memory_dir(), config.resolved_db_path())
            .with_reducer(config.reducer.clone())
            .with_max_chunks(config.projection.max_chunks)
    }

    pub fn with_reducer(mut self, reducer: ReducerConfig) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Project the store, preferring the external reducer.
    pub async fn project(&self, cancel: &CancellationToken) -> Result<Projection> {
        if let Some(points) = reducer::run_external(&self.reducer, &self.db_path, cancel).await {
            return Ok(Projection::External(points));
        }

        let memory_dir = self.memory_dir.clone();
        let db_path = self.db_path.clone();
        let max_chunks = self.max_chunks;
        let cancel = cancel.clone();

        let points = tokio::task::spawn_blocking(move || {
            let mut index = ChunkIndex::new(db_path).with_root_name(root_name(&memory_dir));
            let result = project_in_process(&memory_dir, &mut index, max_chunks, &cancel, Utc::now());
            index.close();
            result
        })
        .await
        .map_err(|e| CoreError::from_join_error("project_in_process", e))??;

        Ok(Projection::Fallback(points))
    }
}

/// The in-process pipeline: load, score, reduce, decorate.
///
/// Fails with [`CoreError::NoEmbeddingsAvailable`] when no chunk has a usable
/// embedding and with [`CoreError::Cancelled`] when `cancel` fires before the
/// store is opened or during the reduction.
pub fn project_in_process(
    memory_dir: &Path,
    index: &mut ChunkIndex,
    max_chunks: usize,
    cancel: &CancellationToken,
    now: DateTime<Utc>,
) -> Result<Vec<EmbeddingPoint>> {
    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }

    let root = index.root_name().to_string();
    let chunks = consistent_dimension(index.all_chunks(max_chunks)?);
    if chunks.is_empty() {
        return Err(CoreError::NoEmbeddingsAvailable);
    }

    let similarities = similarity::hub_similarities(&chunks);

    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }
    let dim = chunks[0].embedding.len();
    let data = Array2::from_shape_fn((chunks.len(), dim), |(i, j)| chunks[i].embedding[j]);
    let coords = pca::project_3d(&data, cancel)?;

    let mut modified_cache: HashMap<&str, Option<DateTime<Utc>>> = HashMap::new();
    let mut per_path: HashMap<&str, usize> = HashMap::new();
    let mut points = Vec::with_capacity(chunks.len());

    for (i, chunk) in chunks.iter().enumerate() {
        let modified = *modified_cache
            .entry(chunk.path.as_str())
            .or_insert_with(|| file_modified(memory_dir, &chunk.path));
        let counter = per_path.entry(chunk.path.as_str()).or_insert(0);
        let chunk_index = *counter;
        *counter += 1;

        points.push(EmbeddingPoint {
            id: chunk.id.clone(),
            path: chunk.path.clone(),
            tier: classify(&chunk.path, &root, modified, now).as_str().to_string(),
            tokens: (chunk.text.len() / 4) as u64,
            x: coords[[i, 0]],
            y: coords[[i, 1]],
            z: coords[[i, 2]],
            chunk_index,
            text: chunk.text.chars().take(POINT_TEXT_CHARS).collect(),
            similarity_to_hub: similarities[i],
            is_hub: paths::is_hub(&chunk.path),
        });
    }

    tracing::info!(points = points.len(), dim, "projection computed in-process");
    Ok(points)
}

/// Keep chunks whose dimensionality matches the first one.
fn consistent_dimension(mut chunks: Vec<Chunk>) -> Vec<Chunk> {
    let Some(dim) = chunks.first().map(|c| c.embedding.len()) else {
        return chunks;
    };
    let before = chunks.len();
    chunks.retain(|c| c.embedding.len() == dim);
    if chunks.len() < before {
        tracing::warn!(
            dropped = before - chunks.len(),
            dim,
            "skipping chunks with mismatched embedding dimensions"
        );
    }
    chunks
}

fn file_modified(memory_dir: &Path, key: &str) -> Option<DateTime<Utc>> {
    let path = resolve_file(memory_dir, key)?;
    let meta = std::fs::metadata(path).ok()?;
    meta.modified().ok().map(DateTime::<Utc>::from)
}
