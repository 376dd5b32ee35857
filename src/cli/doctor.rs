//! CLI `doctor` command: check the memory directory, chunk store and reducer.

use anyhow::{Context, Result};

use strata::config::StrataConfig;
use strata::db;

use super::format_bytes;

/// Run diagnostics and print a health report.
pub fn doctor(config: &StrataConfig) -> Result<()> {
    let memory_dir = config.resolved_memory_dir();
    let db_path = config.resolved_db_path();

    println!("Strata Health Report");
    println!("====================");
    println!();

    println!("Memory directory:  {}", memory_dir.display());
    if memory_dir.is_dir() {
        println!("  Status:          OK");
    } else {
        println!("  Status:          MISSING");
    }
    match strata::memory::structure::hub_path(&memory_dir) {
        Some(hub) if hub.is_file() => println!("  Hub document:    {}", hub.display()),
        Some(hub) => println!("  Hub document:    not found at {}", hub.display()),
        None => println!("  Hub document:    (memory directory has no parent)"),
    }
    println!();

    println!("Chunk store:       {}", db_path.display());
    if !db_path.exists() {
        println!("  Status:          not found. Has the agent indexed its memory yet?");
    } else {
        let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
        println!("  File size:       {}", format_bytes(file_size));

        let conn = db::open_read_only(&db_path).context("failed to open chunk store (may be corrupt)")?;
        let report = db::check_store_health(&conn).context("failed to run health check")?;

        println!("  Chunks:          {}", report.chunk_count);
        println!("  Indexed files:   {}", report.path_count);
        if report.missing_tables.is_empty() {
            println!("  Tables:          OK");
        } else {
            println!("  Tables:          MISSING {}", report.missing_tables.join(", "));
        }
        if report.integrity_ok {
            println!("  Integrity check: PASSED");
        } else {
            println!("  Integrity check: FAILED ({})", report.integrity_details);
        }
    }
    println!();

    let runtime = config.reducer.resolved_runtime();
    let script = config.reducer.resolved_script();
    println!("External reducer:");
    if !config.reducer.enabled {
        println!("  Status:          disabled (in-process PCA only)");
    } else if runtime.is_file() && script.is_file() {
        println!("  Status:          available ({} {})", runtime.display(), script.display());
    } else {
        println!("  Status:          not installed (in-process PCA will be used)");
    }

    Ok(())
}
