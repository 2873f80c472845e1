use thiserror::Error;

/// Failure from the external LLM client (§6, §7 `ModelFailure`).
///
/// This core never retries a failed call — retry policy belongs to the client.
/// A `ModelFailure` aborts the session it occurred in; the caller sees it as an
/// ordinary `Err`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("model request failed: {0}")]
    RequestFailed(String),
    #[error("model response could not be parsed: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure surfaced by a store or issue-tracker collaborator (§6).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("duplicate key")]
    DuplicateKey,
    #[error("store operation failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure from the external code-graph backend (§6).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphError {
    #[error("graph query failed: {0}")]
    QueryFailed(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
