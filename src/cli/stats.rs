use anyhow::Result;

use strata::memory::types::Tier;
use strata::MemoryService;

use super::format_bytes;

/// Display memory statistics in the terminal.
pub async fn stats(service: &MemoryService) -> Result<()> {
    let response = service.load_stats().await?;

    println!("Memory Statistics");
    println!("{}", "=".repeat(40));
    println!("  Memory directory:    {}", response.memory_dir);
    println!("  Files:               {}", response.total_files);
    println!("  Token estimate:      ~{}", response.total_tokens);
    println!();

    println!("By Tier:");
    for tier in Tier::ALL {
        let count = response.files_by_tier.get(tier.as_str()).copied().unwrap_or(0);
        println!("  {:<12} {}", tier.as_str(), count);
    }
    println!();

    println!("Chunk store:           {}", response.db_path);
    println!("  Chunks:              {}", response.total_chunks);
    println!("  Indexed files:       {}", response.indexed_files);
    println!("  Hub chunks:          {}", response.hub_chunks);
    println!("  Size:                {}", format_bytes(response.store_size_bytes));

    Ok(())
}
