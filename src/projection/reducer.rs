//! Out-of-process embedding reducer.
//!
//! Runs `<runtime> <script> <db_path>` and reads `{"points": [...]}` from its
//! stdout. Every failure is reported to the caller as `None`; the in-process
//! projection takes over.

use serde::Deserialize;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::ReducerConfig;
use crate::memory::types::EmbeddingPoint;

#[derive(Debug, Deserialize)]
struct ReducerOutput {
    points: Vec<EmbeddingPoint>,
}

#[derive(Debug, Error)]
enum ReducerFailure {
    #[error("failed to run reducer: {0}")]
    Io(#[from] std::io::Error),
    #[error("reducer timed out after {0:?}")]
    TimedOut(Duration),
    #[error("reducer cancelled")]
    Cancelled,
    #[error("reducer exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },
    #[error("unparseable reducer output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("reducer returned no points")]
    Empty,
}

/// Try the external reducer. `None` when it is disabled, not installed, or
/// fails in any way.
pub async fn run_external(
    config: &ReducerConfig,
    db_path: &Path,
    cancel: &CancellationToken,
) -> Option<Vec<EmbeddingPoint>> {
    if !config.enabled {
        return None;
    }
    let runtime = config.resolved_runtime();
    let script = config.resolved_script();
    if !runtime.is_file() || !script.is_file() {
        tracing::debug!(
            runtime = %runtime.display(),
            script = %script.display(),
            "external reducer not installed"
        );
        return None;
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    match invoke(&runtime, &script, db_path, timeout, cancel).await {
        Ok(points) => {
            tracing::info!(points = points.len(), "projection from external reducer");
            Some(points)
        }
        Err(e) => {
            tracing::warn!(error = %e, "external reducer failed, using in-process projection");
            None
        }
    }
}

async fn invoke(
    runtime: &Path,
    script: &Path,
    db_path: &Path,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<EmbeddingPoint>, ReducerFailure> {
    let child = Command::new(runtime)
        .arg(script)
        .arg(db_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    // Dropping the wait future drops the child, which kills it.
    let output = tokio::select! {
        _ = cancel.cancelled() => return Err(ReducerFailure::Cancelled),
        waited = tokio::time::timeout(timeout, child.wait_with_output()) => match waited {
            Ok(output) => output?,
            Err(_) => return Err(ReducerFailure::TimedOut(timeout)),
        },
    };

    if !output.status.success() {
        return Err(ReducerFailure::Exit {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let parsed: ReducerOutput = serde_json::from_slice(&output.stdout)?;
    if parsed.points.is_empty() {
        return Err(ReducerFailure::Empty);
    }
    Ok(parsed.points)
}
