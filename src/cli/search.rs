use anyhow::Result;

use strata::MemoryService;

/// Run a search from the terminal.
pub async fn search(service: &MemoryService, query: &str, limit: Option<usize>) -> Result<()> {
    let results = service.search(query, limit).await?;

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", results.len());

    for (i, result) in results.iter().enumerate() {
        println!(
            "  {}. {}:{}-{} (score: {:.1})",
            i + 1,
            result.path,
            result.start_line,
            result.end_line,
            result.score,
        );
        println!("     {}", result.snippet.replace('\n', " "));
        println!();
    }

    Ok(())
}
