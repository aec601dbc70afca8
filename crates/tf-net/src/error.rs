//! Error types for tf-net.

use thiserror::Error;

/// Errors raised while writing batches or diagnostics.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, NetError>`.
pub type NetResult<T> = Result<T, NetError>;
