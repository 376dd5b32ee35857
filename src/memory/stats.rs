use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

use crate::db::ChunkIndex;
use crate::error::Result;
use crate::memory::paths::HUB_DOCUMENT;
use crate::memory::structure::load_memory_structure;
use crate::memory::types::{MemoryStats, Tier};

/// Compute memory statistics across the directory tree and the chunk store.
///
/// Fails only when the memory directory is missing. Store counts that cannot
/// be read are reported as zero.
pub fn memory_stats(
    memory_dir: &Path,
    index: &mut ChunkIndex,
    now: DateTime<Utc>,
) -> Result<MemoryStats> {
    let structure = load_memory_structure(memory_dir, index, now)?;

    let mut files_by_tier: BTreeMap<String, u64> =
        Tier::ALL.iter().map(|t| (t.as_str().to_string(), 0)).collect();
    let mut total_files = 0u64;
    let mut total_tokens = 0u64;
    for file in structure.files() {
        *files_by_tier.entry(file.tier.as_str().to_string()).or_insert(0) += 1;
        total_files += 1;
        total_tokens += file.tokens;
    }

    let total_chunks = or_zero(index.total_chunks(), "total chunks");
    let indexed_files = or_zero(index.distinct_path_count(), "distinct paths");
    let hub_chunks = or_zero(index.count_for_path(HUB_DOCUMENT), "hub chunks");

    let store_size_bytes = std::fs::metadata(index.db_path())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(MemoryStats {
        memory_dir: memory_dir.display().to_string(),
        db_path: index.db_path().display().to_string(),
        total_files,
        files_by_tier,
        total_tokens,
        total_chunks,
        indexed_files,
        hub_chunks,
        store_size_bytes,
    })
}

fn or_zero(count: Result<u64>, what: &str) -> u64 {
    count.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "{what} unavailable");
        0
    })
}
