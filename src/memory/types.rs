//! Core memory type definitions.
//!
//! Defines [`Tier`] (retention priority), the directory view types
//! ([`MemoryFile`], [`MemoryFolder`], [`MemoryStructure`]), search hits
//! ([`SearchResult`]) and projected embeddings ([`EmbeddingPoint`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four retention tiers, from most to least likely to be needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// The hub document and root-level files touched within the last week.
    Hot,
    /// Older working notes grouped in dated folders.
    Warm,
    /// Archive material that is not a quarterly rollup.
    Cold,
    /// Quarterly rollups under the archive folder.
    Archive,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Hot, Tier::Warm, Tier::Cold, Tier::Archive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
            Self::Archive => "archive",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(Self::Hot),
            "warm" => Ok(Self::Warm),
            "cold" => Ok(Self::Cold),
            "archive" => Ok(Self::Archive),
            _ => Err(format!("unknown tier: {s}")),
        }
    }
}

/// A memory file on disk, decorated with its tier and chunk count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFile {
    /// Normalized key: relative to the memory root, or `MEMORY.md` for the hub.
    pub path: String,
    pub tier: Tier,
    pub size: u64,
    /// Rough token estimate (`size / 4`).
    pub tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    pub chunk_count: u64,
}

/// Files sharing a top-level directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFolder {
    pub name: String,
    pub tier: Tier,
    pub files: Vec<MemoryFile>,
}

impl MemoryFolder {
    pub fn total_tokens(&self) -> u64 {
        self.files.iter().map(|f| f.tokens).sum()
    }
}

/// Tiered view of the whole memory tree. Rebuilt on every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStructure {
    pub hot: Vec<MemoryFile>,
    pub warm: Vec<MemoryFolder>,
    pub cold: Vec<MemoryFolder>,
    pub archive: Vec<MemoryFile>,
}

impl MemoryStructure {
    /// Every file in the structure, hot first, then folders, then archive.
    pub fn files(&self) -> impl Iterator<Item = &MemoryFile> {
        self.hot
            .iter()
            .chain(self.warm.iter().flat_map(|f| f.files.iter()))
            .chain(self.cold.iter().flat_map(|f| f.files.iter()))
            .chain(self.archive.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.files().next().is_none()
    }
}

/// A single search hit with a snippet around the first match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub path: String,
    pub snippet: String,
    pub score: f64,
    pub start_line: i64,
    pub end_line: i64,
}

/// One chunk placed in 3-D space for visualization.
///
/// Also the wire shape of the external reducer's output, which may use
/// camelCase keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingPoint {
    pub id: String,
    pub path: String,
    pub tier: String,
    #[serde(default)]
    pub tokens: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, alias = "chunkIndex")]
    pub chunk_index: usize,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "similarityToHub")]
    pub similarity_to_hub: f64,
    #[serde(default, alias = "isHub")]
    pub is_hub: bool,
}

/// Aggregate counts across the memory tree and the chunk store.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStats {
    pub memory_dir: String,
    pub db_path: String,
    pub total_files: u64,
    pub files_by_tier: BTreeMap<String, u64>,
    pub total_tokens: u64,
    pub total_chunks: u64,
    pub indexed_files: u64,
    pub hub_chunks: u64,
    pub store_size_bytes: u64,
}
