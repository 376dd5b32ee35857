//! Path keys shared by the directory walk and the chunk store.
//!
//! Files found on disk and chunk rows written by the indexer are joined by
//! exact string equality, so both sides go through [`store_key`] before they
//! are compared.

use std::path::{Component, Path};

/// Canonical file name of the hub document.
pub const HUB_DOCUMENT: &str = "MEMORY.md";

/// Directory name the indexer uses for the tiered memory folder.
pub const DEFAULT_ROOT_NAME: &str = "memory";

/// Normalize a stored or on-disk relative path into the join key.
///
/// Separators become `/`, leading `./` and `/` are dropped, and a leading
/// `<root_name>/` prefix (the indexer records paths relative to the workspace,
/// the walk records them relative to the memory folder) is stripped. The
/// prefix stays on a file named like the hub so it never collides with the
/// hub itself.
pub fn store_key(raw: &str, root_name: &str) -> String {
    let mut key = raw.replace('\\', "/");
    while let Some(rest) = key.strip_prefix("./") {
        key = rest.to_string();
    }
    let key = key.trim_start_matches('/');
    let prefix = format!("{root_name}/");
    match key.strip_prefix(prefix.as_str()) {
        Some(rest) if !rest.is_empty() && rest != HUB_DOCUMENT => rest.to_string(),
        _ => key.to_string(),
    }
}

/// Join key for a file located under `root`.
pub fn relative_key(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

pub fn is_hub(key: &str) -> bool {
    key == HUB_DOCUMENT
}

/// Key of a hub-named file inside the memory folder, as opposed to the hub
/// one level up.
pub fn nested_hub_key(root_name: &str) -> String {
    format!("{root_name}/{HUB_DOCUMENT}")
}

/// Key for a file found by the directory walk, given its path relative to the
/// memory folder.
pub fn walk_key(relative: String, root_name: &str) -> String {
    if is_hub(&relative) {
        nested_hub_key(root_name)
    } else {
        relative
    }
}

/// True for files directly inside the memory folder.
pub fn is_root_level(key: &str, root_name: &str) -> bool {
    !key.contains('/') || key == nested_hub_key(root_name)
}

/// First path segment of a key that has a directory prefix.
pub fn top_level_segment(key: &str) -> Option<&str> {
    key.split_once('/').map(|(first, _)| first)
}

pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Directory segments of a key, excluding the file name.
pub fn dir_segments(key: &str) -> impl Iterator<Item = &str> {
    let dirs = key.rsplit_once('/').map(|(dirs, _)| dirs).unwrap_or("");
    dirs.split('/').filter(|s| !s.is_empty())
}
