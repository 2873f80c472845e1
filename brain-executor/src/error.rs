use brain_types::{GraphError, StoreError};
use thiserror::Error;

/// Failure applying one [`brain_types::Action`] (§7 `ActionExecutionFailure`).
///
/// Never aborts a batch: the executor collects one of these per failed action and
/// keeps applying the rest (§4.5).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActionError {
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
    #[error("code-graph operation failed: {0}")]
    Graph(#[from] GraphError),
    #[error("action data was malformed: {0}")]
    InvalidData(String),
}
