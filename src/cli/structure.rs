use anyhow::Result;

use strata::memory::types::{MemoryFile, MemoryFolder};
use strata::MemoryService;

/// Print the tiered memory tree.
pub async fn structure(service: &MemoryService, json: bool) -> Result<()> {
    let structure = service.load_memory_structure().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&structure)?);
        return Ok(());
    }

    println!("HOT ({} files)", structure.hot.len());
    for file in &structure.hot {
        print_file(file, 2);
    }
    println!();

    print_folders("WARM", &structure.warm);
    print_folders("COLD", &structure.cold);

    println!("ARCHIVE ({} files)", structure.archive.len());
    for file in &structure.archive {
        print_file(file, 2);
    }

    Ok(())
}

fn print_folders(label: &str, folders: &[MemoryFolder]) {
    println!("{label} ({} folders)", folders.len());
    for folder in folders {
        println!(
            "  {}/  {} files, ~{} tokens",
            folder.name,
            folder.files.len(),
            folder.total_tokens()
        );
        for file in &folder.files {
            print_file(file, 4);
        }
    }
    println!();
}

fn print_file(file: &MemoryFile, indent: usize) {
    let modified = file
        .modified
        .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "{:indent$}{:<40} {:>7} tok  {:>4} chunks  {}",
        "",
        file.path,
        file.tokens,
        file.chunk_count,
        modified,
        indent = indent
    );
}
