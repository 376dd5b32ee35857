//! Layout of the chunk store written by the external indexer.
//!
//! The indexer owns this schema. Strata opens the store read-only and never
//! runs this DDL against a live database; it exists so fixtures can build a
//! compatible store and so `doctor` knows which tables to look for.

use rusqlite::Connection;

/// Tables the engine reads from.
pub const REQUIRED_TABLES: &[&str] = &["chunks", "chunks_fts"];

const SCHEMA_SQL: &str = r#"
-- One row per indexed text slice
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    path TEXT NOT NULL,
    text TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    embedding TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_path ON chunks(path);

-- Full-text index keyed to chunks.id
CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
    text,
    id UNINDEXED,
    path UNINDEXED,
    start_line UNINDEXED,
    end_line UNINDEXED
);
"#;

/// Create the indexer's tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Insert one chunk into both the row table and the full-text index.
pub fn insert_chunk(
    conn: &Connection,
    id: &str,
    path: &str,
    text: &str,
    lines: (i64, i64),
    embedding: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO chunks (id, path, text, start_line, end_line, embedding) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![id, path, text, lines.0, lines.1, embedding],
    )?;
    conn.execute(
        "INSERT INTO chunks_fts (text, id, path, start_line, end_line) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![text, id, path, lines.0, lines.1],
    )?;
    Ok(())
}
