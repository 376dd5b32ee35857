use anyhow::Result;

use strata::MemoryService;

/// Print one memory file.
pub async fn show(service: &MemoryService, path: &str) -> Result<()> {
    let content = service.read_file(path).await?;
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}
