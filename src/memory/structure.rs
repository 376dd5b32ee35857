//! Tiered view of the memory directory.
//!
//! The hub document sits one level above the memory folder. Everything under
//! the folder is walked, classified with [`classify`], and grouped: hot and
//! archive files stay flat, warm and cold files are grouped into folders by
//! their top-level directory.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

use crate::db::ChunkIndex;
use crate::error::{CoreError, Result};
use crate::memory::paths::{self, HUB_DOCUMENT};
use crate::memory::tier::{classify, ARCHIVE_SEGMENT};
use crate::memory::types::{MemoryFile, MemoryFolder, MemoryStructure, Tier};

/// Folder name for root-level files that are not hot.
pub const ROOT_FOLDER: &str = ".";

const MEMORY_EXTENSIONS: &[&str] = &["md", "json"];

/// Build the tiered structure of `memory_dir`.
///
/// Fails with [`CoreError::PathNotFound`] only when `memory_dir` itself is
/// missing. A missing hub, an unreadable subdirectory or an unreadable file is
/// skipped. Chunk counts come from `index` and fall back to zero.
pub fn load_memory_structure(
    memory_dir: &Path,
    index: &mut ChunkIndex,
    now: DateTime<Utc>,
) -> Result<MemoryStructure> {
    if !memory_dir.is_dir() {
        return Err(CoreError::PathNotFound(memory_dir.to_path_buf()));
    }

    let root = root_name(memory_dir);
    let counts = index.chunk_counts_by_path();
    let mut structure = MemoryStructure::default();

    if let Some(hub_path) = hub_path(memory_dir) {
        match std::fs::metadata(&hub_path) {
            Ok(meta) if meta.is_file() => {
                structure
                    .hot
                    .push(memory_file(HUB_DOCUMENT.to_string(), Tier::Hot, &meta, &counts));
            }
            _ => tracing::debug!(path = %hub_path.display(), "no hub document"),
        }
    }

    let mut groups: BTreeMap<String, Vec<MemoryFile>> = BTreeMap::new();
    for path in walk_memory_files(memory_dir) {
        let Some(key) = paths::relative_key(memory_dir, &path) else {
            continue;
        };
        let key = paths::walk_key(key, &root);
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable memory file");
                continue;
            }
        };

        let modified = meta.modified().ok().map(DateTime::<Utc>::from);
        let tier = classify(&key, &root, modified, now);
        let file = memory_file(key, tier, &meta, &counts);

        match tier {
            Tier::Hot => structure.hot.push(file),
            Tier::Archive => structure.archive.push(file),
            Tier::Warm | Tier::Cold => {
                let group = if paths::is_root_level(&file.path, &root) {
                    ROOT_FOLDER
                } else {
                    paths::top_level_segment(&file.path).unwrap_or(ROOT_FOLDER)
                }
                .to_string();
                groups.entry(group).or_default().push(file);
            }
        }
    }

    // Descending name order puts the newest date-named folder first.
    for (name, mut files) in groups.into_iter().rev() {
        sort_by_modified_desc(&mut files);
        let tier = if name.contains(ARCHIVE_SEGMENT) {
            Tier::Cold
        } else {
            Tier::Warm
        };
        let folder = MemoryFolder { name, tier, files };
        match tier {
            Tier::Cold => structure.cold.push(folder),
            _ => structure.warm.push(folder),
        }
    }

    sort_by_modified_desc(&mut structure.hot);
    structure.hot.sort_by_key(|f| !paths::is_hub(&f.path));
    sort_by_modified_desc(&mut structure.archive);

    tracing::debug!(
        hot = structure.hot.len(),
        warm = structure.warm.len(),
        cold = structure.cold.len(),
        archive = structure.archive.len(),
        "memory structure built"
    );
    Ok(structure)
}

/// Location of the hub document for a memory folder.
pub fn hub_path(memory_dir: &Path) -> Option<PathBuf> {
    memory_dir.parent().map(|parent| parent.join(HUB_DOCUMENT))
}

/// On-disk location of a normalized key. `None` for keys that try to leave the
/// memory folder.
pub fn resolve_file(memory_dir: &Path, key: &str) -> Option<PathBuf> {
    if paths::is_hub(key) {
        return hub_path(memory_dir);
    }
    if key == paths::nested_hub_key(&root_name(memory_dir)) {
        return Some(memory_dir.join(HUB_DOCUMENT));
    }
    let rel = Path::new(key);
    let escapes = rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if key.is_empty() || escapes {
        return None;
    }
    Some(memory_dir.join(rel))
}

/// Read one memory file by key.
pub fn read_memory_file(memory_dir: &Path, key: &str) -> Result<String> {
    let key = paths::store_key(key, &root_name(memory_dir));
    let path = resolve_file(memory_dir, &key)
        .ok_or_else(|| CoreError::FileNotFound(PathBuf::from(&key)))?;
    if !path.is_file() {
        return Err(CoreError::FileNotFound(path));
    }
    std::fs::read_to_string(&path).map_err(|source| CoreError::Io { path, source })
}

/// Directory name the memory folder goes by in stored paths.
pub fn root_name(memory_dir: &Path) -> String {
    memory_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| paths::DEFAULT_ROOT_NAME.to_string())
}

fn memory_file(
    key: String,
    tier: Tier,
    meta: &Metadata,
    counts: &HashMap<String, u64>,
) -> MemoryFile {
    let size = meta.len();
    MemoryFile {
        chunk_count: counts.get(&key).copied().unwrap_or(0),
        path: key,
        tier,
        size,
        tokens: size / 4,
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
    }
}

fn sort_by_modified_desc(files: &mut [MemoryFile]) {
    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
}

/// Recursively collect `.md` and `.json` files, skipping hidden entries.
fn walk_memory_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            match entry.file_type() {
                Ok(ft) if ft.is_dir() => pending.push(path),
                Ok(_) if has_memory_extension(&path) => files.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping entry");
                }
            }
        }
    }
    files
}

fn has_memory_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MEMORY_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}
