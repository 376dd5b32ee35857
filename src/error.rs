//! Typed failure conditions surfaced to callers.
//!
//! Only store-level and root-level unavailability propagate. Per-item problems
//! (one malformed embedding, one unreadable file, one failed FTS bind) are
//! logged and skipped where they happen and never reach this type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the memory engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The chunk store could not be opened or is not a readable SQLite database.
    #[error("failed to open chunk store at {path}: {reason}")]
    StoreOpenFailed { path: PathBuf, reason: String },

    /// The memory root directory does not exist.
    #[error("memory directory not found: {0}")]
    PathNotFound(PathBuf),

    /// A single requested memory file does not exist.
    #[error("memory file not found: {0}")]
    FileNotFound(PathBuf),

    /// The store holds no chunk with a parseable embedding.
    #[error("no embeddings available in the chunk store")]
    NoEmbeddingsAvailable,

    /// A unit of work exceeded its deadline.
    #[error("{operation} timed out after {seconds}s")]
    OperationTimedOut { operation: &'static str, seconds: u64 },

    /// The caller cancelled the operation before it produced a result.
    #[error("operation cancelled")]
    Cancelled,

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Map a blocking task that did not return. A panic is resumed on the
    /// awaiting thread; anything else means the runtime dropped the task.
    pub(crate) fn from_join_error(operation: &'static str, e: tokio::task::JoinError) -> Self {
        if e.is_panic() {
            std::panic::resume_unwind(e.into_panic());
        }
        tracing::warn!(operation, error = %e, "blocking task did not complete");
        CoreError::Cancelled
    }
}
