mod helpers;

use chrono::Utc;
use helpers::{add_chunk, Workspace};
use strata::db::ChunkIndex;
use strata::memory::structure::{load_memory_structure, ROOT_FOLDER};
use strata::memory::types::Tier;
use strata::{CoreError, MemoryService};

fn index_for(ws: &Workspace) -> ChunkIndex {
    ChunkIndex::new(&ws.db_path).with_root_name("memory")
}

#[test]
fn hub_only_workspace() {
    let ws = Workspace::new();
    ws.write_hub("# Memory\n\nCore facts.\n");

    let structure = load_memory_structure(&ws.memory_dir, &mut index_for(&ws), Utc::now()).unwrap();
    assert_eq!(structure.hot.len(), 1);
    assert_eq!(structure.hot[0].path, "MEMORY.md");
    assert_eq!(structure.hot[0].tier, Tier::Hot);
    assert!(structure.warm.is_empty());
    assert!(structure.cold.is_empty());
    assert!(structure.archive.is_empty());
}

#[test]
fn empty_folder_without_hub_is_empty() {
    let ws = Workspace::new();
    let structure = load_memory_structure(&ws.memory_dir, &mut index_for(&ws), Utc::now()).unwrap();
    assert!(structure.is_empty());
}

#[test]
fn missing_memory_folder_is_an_error() {
    let ws = Workspace::new();
    let missing = ws.tmp.path().join("nowhere");
    let err = load_memory_structure(&missing, &mut index_for(&ws), Utc::now()).unwrap_err();
    assert!(matches!(err, CoreError::PathNotFound(p) if p == missing));
}

#[test]
fn mixed_tree_is_grouped_by_tier() {
    let ws = Workspace::new();
    ws.write_hub("hub");
    ws.write_file("today.md", "fresh root note");
    ws.write_aged_file("old-root.md", "stale root note", 30);
    ws.write_file("2026-01/standup.md", "january");
    ws.write_aged_file("2025-12/retro.md", "december", 40);
    ws.write_file("archive/2025-Q3-summary.md", "quarter rollup");
    ws.write_file("archive/loose-note.md", "archived but not rolled up");
    ws.write_file("scratch.txt", "not a memory file");
    ws.write_file(".draft.md", "hidden");
    ws.write_file(".cache/ignored.md", "hidden dir");

    let structure = load_memory_structure(&ws.memory_dir, &mut index_for(&ws), Utc::now()).unwrap();

    let hot: Vec<&str> = structure.hot.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(hot, vec!["MEMORY.md", "today.md"]);

    let warm: Vec<&str> = structure.warm.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(warm, vec!["2026-01", "2025-12", ROOT_FOLDER]);
    let root = structure.warm.iter().find(|f| f.name == ROOT_FOLDER).unwrap();
    assert_eq!(root.files.len(), 1);
    assert_eq!(root.files[0].path, "old-root.md");
    assert!(structure.warm.iter().all(|f| f.tier == Tier::Warm));

    assert_eq!(structure.cold.len(), 1);
    assert_eq!(structure.cold[0].name, "archive");
    assert_eq!(structure.cold[0].tier, Tier::Cold);
    assert_eq!(structure.cold[0].files[0].path, "archive/loose-note.md");

    assert_eq!(structure.archive.len(), 1);
    assert_eq!(structure.archive[0].path, "archive/2025-Q3-summary.md");
    assert_eq!(structure.archive[0].tier, Tier::Archive);

    assert_eq!(structure.files().count(), 7);
}

#[test]
fn warm_folder_files_are_newest_first() {
    let ws = Workspace::new();
    ws.write_aged_file("2026-02/older.md", "x", 20);
    ws.write_aged_file("2026-02/newer.md", "x", 10);

    let structure = load_memory_structure(&ws.memory_dir, &mut index_for(&ws), Utc::now()).unwrap();
    let files: Vec<&str> = structure.warm[0].files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(files, vec!["2026-02/newer.md", "2026-02/older.md"]);
}

#[test]
fn chunk_counts_come_from_the_store() {
    let ws = Workspace::new();
    ws.write_hub("hub");
    ws.write_file("2026-01/standup.md", "january");
    let conn = ws.store();
    add_chunk(&conn, "h1", "MEMORY.md", "hub", &[1.0]);
    add_chunk(&conn, "s1", "memory/2026-01/standup.md", "part one", &[1.0]);
    add_chunk(&conn, "s2", "memory/2026-01/standup.md", "part two", &[1.0]);
    drop(conn);

    let structure = load_memory_structure(&ws.memory_dir, &mut index_for(&ws), Utc::now()).unwrap();
    assert_eq!(structure.hot[0].chunk_count, 1);
    assert_eq!(structure.warm[0].files[0].chunk_count, 2);
}

#[test]
fn missing_store_means_zero_chunk_counts() {
    let ws = Workspace::new();
    ws.write_hub("hub");
    ws.write_file("notes/a.md", "0123456789abcdef");

    let structure = load_memory_structure(&ws.memory_dir, &mut index_for(&ws), Utc::now()).unwrap();
    let file = &structure.warm[0].files[0];
    assert_eq!(file.chunk_count, 0);
    assert_eq!(file.size, 16);
    assert_eq!(file.tokens, 4);
}

#[tokio::test]
async fn service_reads_files_by_key() {
    let ws = Workspace::new();
    ws.write_hub("# Hub\n");
    ws.write_file("notes/a.md", "alpha");
    let service = MemoryService::new(ws.config());

    assert_eq!(service.read_file("notes/a.md").await.unwrap(), "alpha");
    assert_eq!(service.read_file("memory/notes/a.md").await.unwrap(), "alpha");
    assert_eq!(service.read_file("MEMORY.md").await.unwrap(), "# Hub\n");

    let err = service.read_file("notes/missing.md").await.unwrap_err();
    assert!(matches!(err, CoreError::FileNotFound(_)));
    let err = service.read_file("../secret.md").await.unwrap_err();
    assert!(matches!(err, CoreError::FileNotFound(_)));
}

#[tokio::test]
async fn service_stats_summarize_tree_and_store() {
    let ws = Workspace::new();
    ws.write_hub("hub!");
    ws.write_file("today.md", "12345678");
    ws.write_file("2026-01/a.md", "abcd");
    ws.write_file("archive/2025-Q4.md", "q");
    let conn = ws.store();
    add_chunk(&conn, "h1", "MEMORY.md", "hub", &[1.0]);
    add_chunk(&conn, "h2", "MEMORY.md", "hub again", &[1.0]);
    add_chunk(&conn, "a1", "memory/2026-01/a.md", "abcd", &[1.0]);
    drop(conn);

    let stats = MemoryService::new(ws.config()).load_stats().await.unwrap();
    assert_eq!(stats.total_files, 4);
    assert_eq!(stats.files_by_tier["hot"], 2);
    assert_eq!(stats.files_by_tier["warm"], 1);
    assert_eq!(stats.files_by_tier["cold"], 0);
    assert_eq!(stats.files_by_tier["archive"], 1);
    assert_eq!(stats.total_tokens, 1 + 2 + 1);
    assert_eq!(stats.total_chunks, 3);
    assert_eq!(stats.indexed_files, 2);
    assert_eq!(stats.hub_chunks, 2);
    assert!(stats.store_size_bytes > 0);
}

#[tokio::test]
async fn service_stats_survive_a_missing_store() {
    let ws = Workspace::new();
    ws.write_file("notes/a.md", "abcd");

    let stats = MemoryService::new(ws.config()).load_stats().await.unwrap();
    assert_eq!(stats.total_files, 1);
    assert_eq!(stats.total_chunks, 0);
    assert_eq!(stats.store_size_bytes, 0);
}

#[test]
fn hub_named_file_inside_memory_folder_is_not_the_hub() {
    let ws = Workspace::new();
    ws.write_hub("hub");
    ws.write_aged_file("MEMORY.md", "an old copy", 30);
    let conn = ws.store();
    add_chunk(&conn, "h1", "MEMORY.md", "hub", &[1.0]);
    add_chunk(&conn, "n1", "memory/MEMORY.md", "old copy", &[1.0]);
    add_chunk(&conn, "n2", "memory/MEMORY.md", "old copy again", &[1.0]);
    drop(conn);

    let structure = load_memory_structure(&ws.memory_dir, &mut index_for(&ws), Utc::now()).unwrap();
    let hot: Vec<(&str, u64)> = structure
        .hot
        .iter()
        .map(|f| (f.path.as_str(), f.chunk_count))
        .collect();
    assert_eq!(hot, vec![("MEMORY.md", 1)]);

    assert_eq!(structure.warm.len(), 1);
    assert_eq!(structure.warm[0].name, ROOT_FOLDER);
    let inner = &structure.warm[0].files[0];
    assert_eq!(inner.path, "memory/MEMORY.md");
    assert_eq!(inner.tier, Tier::Warm);
    assert_eq!(inner.chunk_count, 2);
}

#[tokio::test]
async fn hub_named_file_inside_memory_folder_is_read_from_the_folder() {
    let ws = Workspace::new();
    ws.write_hub("the hub");
    ws.write_file("MEMORY.md", "the inner copy");
    let service = MemoryService::new(ws.config());

    assert_eq!(service.read_file("MEMORY.md").await.unwrap(), "the hub");
    assert_eq!(service.read_file("memory/MEMORY.md").await.unwrap(), "the inner copy");

    let stats = service.load_stats().await.unwrap();
    assert_eq!(stats.total_files, 2);
}
