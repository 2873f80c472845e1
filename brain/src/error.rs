use thiserror::Error;

/// Top-level failure for the CLI driver (§10.3).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BrainError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
