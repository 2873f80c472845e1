//! Object-safe tool registry (§4.1).
//!
//! Every tool returns prose, even on failure — the contract is that the model sees
//! `"Error: ..."` strings and reacts to them rather than the call throwing. `ToolError`
//! exists for the registry's own bookkeeping (an unregistered name), not for the tool
//! bodies themselves.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),
    #[error("invalid tool input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A boxed future of a tool call's result, for use in the object-safe [`ToolDyn`] trait.
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>>;

/// A single exploration primitive (search/glob/read/tree/graph, §4.1).
///
/// Kept object-safe (no RPITIT) via a manually boxed future, so a [`ToolRegistry`] can
/// hold a heterogeneous `Vec`/`HashMap` of `Arc<dyn ToolDyn>`.
pub trait ToolDyn: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    fn call(&self, input: Value) -> ToolFuture<'_>;
}

/// A closed-world registry of tools exposed to one control loop.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolDyn>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn ToolDyn>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolDyn>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ToolDyn>> {
        self.tools.values()
    }

    /// Name/description/schema tuples suitable for assembling a model-facing tool list.
    pub fn definitions(&self) -> Vec<(String, String, Value)> {
        self.tools
            .values()
            .map(|t| (t.name().to_string(), t.description().to_string(), t.input_schema()))
            .collect()
    }

    /// Calls the named tool, or returns `ToolError::NotFound` if it isn't registered.
    pub async fn call(&self, name: &str, input: Value) -> Result<String, ToolError> {
        match self.get(name) {
            Some(tool) => tool.call(input).await,
            None => Err(ToolError::NotFound(name.to_string())),
        }
    }
}
