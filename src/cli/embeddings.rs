use anyhow::Result;
use tokio_util::sync::CancellationToken;

use strata::MemoryService;

/// Compute the 3-D projection and print it. Ctrl-C cancels the run.
pub async fn embeddings(service: &MemoryService, json: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let projection = service.load_embeddings(&cancel).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "strategy": projection.strategy(),
                "points": projection.points(),
            }))?
        );
        return Ok(());
    }

    println!(
        "{} point(s) via {} projection\n",
        projection.points().len(),
        projection.strategy()
    );
    for point in projection.points() {
        println!(
            "  {:>7.3} {:>7.3} {:>7.3}  sim {:.2}  [{:<7}] {}#{}{}",
            point.x,
            point.y,
            point.z,
            point.similarity_to_hub,
            point.tier,
            point.path,
            point.chunk_index,
            if point.is_hub { "  (hub)" } else { "" },
        );
    }

    Ok(())
}
