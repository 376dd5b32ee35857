#![allow(dead_code)]

use rusqlite::Connection;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use strata::config::StrataConfig;
use strata::db;

/// A throwaway agent workspace: `<tmp>/workspace/MEMORY.md` as the hub,
/// `<tmp>/workspace/memory/` as the memory folder and `<tmp>/main.sqlite` as
/// the chunk store.
pub struct Workspace {
    pub tmp: TempDir,
    pub memory_dir: PathBuf,
    pub db_path: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let memory_dir = tmp.path().join("workspace").join("memory");
        std::fs::create_dir_all(&memory_dir).unwrap();
        let db_path = tmp.path().join("main.sqlite");
        Self {
            tmp,
            memory_dir,
            db_path,
        }
    }

    /// Config pointing at this workspace with the external reducer off.
    pub fn config(&self) -> StrataConfig {
        let mut config = StrataConfig::for_paths(&self.memory_dir, &self.db_path);
        config.reducer.enabled = false;
        config
    }

    pub fn write_hub(&self, content: &str) -> PathBuf {
        let path = self.memory_dir.parent().unwrap().join("MEMORY.md");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a file under the memory folder, creating parent directories.
    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.memory_dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a file and backdate its modification time.
    pub fn write_aged_file(&self, rel: &str, content: &str, days_old: u64) -> PathBuf {
        let path = self.write_file(rel, content);
        set_age(&path, days_old);
        path
    }

    /// Create the chunk store with the indexer's schema and return a
    /// writable connection for seeding it.
    pub fn store(&self) -> Connection {
        let conn = Connection::open(&self.db_path).unwrap();
        db::schema::init_schema(&conn).unwrap();
        conn
    }
}

pub fn set_age(path: &Path, days_old: u64) {
    let when = SystemTime::now() - Duration::from_secs(days_old * 24 * 60 * 60);
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}

/// Insert a chunk into both the row table and the FTS index.
pub fn add_chunk(conn: &Connection, id: &str, path: &str, text: &str, embedding: &[f64]) {
    let embedding = serde_json::to_string(embedding).unwrap();
    db::schema::insert_chunk(conn, id, path, text, (1, 5), &embedding).unwrap();
}

/// Insert a chunk into the row table only, so only the substring stage can
/// find it.
pub fn add_unindexed_chunk(conn: &Connection, id: &str, path: &str, text: &str) {
    conn.execute(
        "INSERT INTO chunks (id, path, text, start_line, end_line, embedding) \
         VALUES (?1, ?2, ?3, 1, 5, '[]')",
        rusqlite::params![id, path, text],
    )
    .unwrap();
}
