pub mod index;
pub mod schema;

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::path::Path;

use crate::error::{CoreError, Result};

pub use index::{Chunk, ChunkIndex};

/// Open the chunk store read-only.
///
/// SQLite defers reading the file header until the first statement, so the
/// connection is probed once here; a file that is not a database fails at open
/// time rather than at the first query.
pub fn open_read_only(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let open_failed = |reason: String| CoreError::StoreOpenFailed {
        path: path.to_path_buf(),
        reason,
    };

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_URI;
    let conn = Connection::open_with_flags(path, flags).map_err(|e| open_failed(e.to_string()))?;

    conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map_err(|e| open_failed(e.to_string()))?;

    tracing::debug!(path = %path.display(), "chunk store opened read-only");
    Ok(conn)
}

/// Result of a store health check.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub integrity_ok: bool,
    pub integrity_details: String,
    pub missing_tables: Vec<String>,
    pub chunk_count: u64,
    pub path_count: u64,
}

/// Run read-only diagnostics: integrity, expected tables, row counts.
pub fn check_store_health(conn: &Connection) -> rusqlite::Result<HealthReport> {
    let integrity: String = conn.query_row("PRAGMA quick_check", [], |row| row.get(0))?;
    let integrity_ok = integrity == "ok";

    let mut missing_tables = Vec::new();
    for table in schema::REQUIRED_TABLES {
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = ?1",
            [table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            missing_tables.push(table.to_string());
        }
    }

    let (chunk_count, path_count) = if missing_tables.iter().any(|t| t == "chunks") {
        (0, 0)
    } else {
        conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT path) FROM chunks",
            [],
            |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64)),
        )?
    };

    Ok(HealthReport {
        integrity_ok,
        integrity_details: integrity,
        missing_tables,
        chunk_count,
        path_count,
    })
}
