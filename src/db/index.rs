//! Read-only accessor over the indexer's chunk store.
//!
//! A [`ChunkIndex`] belongs to one unit of work: it opens its connection on
//! first use and is closed (or dropped) when the work is done. Stored paths are
//! normalized with [`store_key`] before they leave this module.

use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::memory::paths::{store_key, DEFAULT_ROOT_NAME};

/// Default cap on chunks loaded for projection.
pub const DEFAULT_CHUNK_LIMIT: usize = 500;

/// One indexed slice of a memory file.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub id: String,
    /// Normalized path key.
    pub path: String,
    pub text: String,
    pub start_line: i64,
    pub end_line: i64,
    pub embedding: Vec<f64>,
}

pub struct ChunkIndex {
    db_path: PathBuf,
    root_name: String,
    conn: Option<Connection>,
}

impl ChunkIndex {
    /// Reader for the store at `db_path`. Nothing is opened until first use.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            root_name: DEFAULT_ROOT_NAME.to_string(),
            conn: None,
        }
    }

    /// Name of the memory folder as the indexer records it in stored paths.
    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = root_name.into();
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Normalize a path the same way stored paths are normalized.
    pub fn key(&self, raw: &str) -> String {
        store_key(raw, &self.root_name)
    }

    /// Borrow the connection, opening it on first use.
    pub fn connection(&mut self) -> Result<&Connection> {
        if self.conn.is_none() {
            self.conn = Some(super::open_read_only(&self.db_path)?);
        }
        match self.conn.as_ref() {
            Some(conn) => Ok(conn),
            None => Err(store_error(&self.db_path, "connection unavailable")),
        }
    }

    /// Close the connection. The next call reopens it.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!(error = %e, "failed to close chunk store cleanly");
            }
        }
    }

    /// Chunk count per normalized path. Any store failure degrades to an
    /// empty map so callers fall back to zero counts.
    pub fn chunk_counts_by_path(&mut self) -> HashMap<String, u64> {
        match self.query_counts() {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(error = %e, db = %self.db_path.display(), "chunk counts unavailable");
                HashMap::new()
            }
        }
    }

    fn query_counts(&mut self) -> Result<HashMap<String, u64>> {
        let root_name = self.root_name.clone();
        let db_path = self.db_path.clone();
        let conn = self.connection()?;
        let rows = conn
            .prepare("SELECT path, COUNT(*) FROM chunks GROUP BY path")
            .and_then(|mut stmt| {
                let rows = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            })
            .map_err(|e| store_error(&db_path, e))?;

        let mut counts = HashMap::new();
        for (path, count) in rows {
            *counts.entry(store_key(&path, &root_name)).or_insert(0) += count as u64;
        }
        Ok(counts)
    }

    /// Up to `limit` chunks ordered by `(path, start_line)`.
    ///
    /// Rows that fail to decode or whose embedding is not a non-empty JSON
    /// float array are skipped.
    pub fn all_chunks(&mut self, limit: usize) -> Result<Vec<Chunk>> {
        let root_name = self.root_name.clone();
        let db_path = self.db_path.clone();
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, path, text, start_line, end_line, embedding FROM chunks \
                 ORDER BY path, start_line LIMIT ?1",
            )
            .map_err(|e| store_error(&db_path, e))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(|e| store_error(&db_path, e))?;

        let mut chunks = Vec::new();
        let mut skipped = 0usize;
        for row in rows {
            let (id, path, text, start_line, end_line, raw_embedding) = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable chunk row");
                    skipped += 1;
                    continue;
                }
            };
            let Some(embedding) = parse_embedding(&raw_embedding) else {
                tracing::debug!(id = %id, "skipping chunk with malformed embedding");
                skipped += 1;
                continue;
            };
            chunks.push(Chunk {
                id,
                path: store_key(&path, &root_name),
                text,
                start_line,
                end_line,
                embedding,
            });
        }

        tracing::debug!(loaded = chunks.len(), skipped, limit, "chunks loaded");
        Ok(chunks)
    }

    pub fn total_chunks(&mut self) -> Result<u64> {
        let db_path = self.db_path.clone();
        let conn = self.connection()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| store_error(&db_path, e))?;
        Ok(count as u64)
    }

    /// Number of distinct normalized paths with at least one chunk.
    pub fn distinct_path_count(&mut self) -> Result<u64> {
        let root_name = self.root_name.clone();
        let db_path = self.db_path.clone();
        let conn = self.connection()?;
        let paths = conn
            .prepare("SELECT DISTINCT path FROM chunks")
            .and_then(|mut stmt| {
                let paths = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>();
                paths
            })
            .map_err(|e| store_error(&db_path, e))?;

        let keys: HashSet<String> = paths.iter().map(|p| store_key(p, &root_name)).collect();
        Ok(keys.len() as u64)
    }

    /// Chunks stored for one path, matching both the bare key and the
    /// root-prefixed form the indexer may have written, when that form
    /// normalizes back to the same key.
    pub fn count_for_path(&mut self, path: &str) -> Result<u64> {
        let key = self.key(path);
        let prefixed = format!("{}/{}", self.root_name, key);
        let prefixed = if self.key(&prefixed) == key {
            prefixed
        } else {
            key.clone()
        };
        let db_path = self.db_path.clone();
        let conn = self.connection()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM chunks WHERE path = ?1 OR path = ?2",
                params![key, prefixed],
                |row| row.get(0),
            )
            .map_err(|e| store_error(&db_path, e))?;
        Ok(count as u64)
    }
}

/// A store that cannot be queried is as unavailable as one that cannot be opened.
fn store_error(db_path: &Path, reason: impl ToString) -> CoreError {
    CoreError::StoreOpenFailed {
        path: db_path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Parse a stored embedding. `None` unless it is a non-empty float array.
pub fn parse_embedding(raw: &str) -> Option<Vec<f64>> {
    match serde_json::from_str::<Vec<f64>>(raw) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}
