use async_trait::async_trait;
use brain_types::{CodeGraphClient, GraphError, GraphNode, SymbolSearchOptions};

/// A [`CodeGraphClient`] with no backend, for driving the CLI without a code-graph
/// service wired up. Every `graph` tool call against it answers with an empty result
/// set rather than failing, so `run` still completes.
#[derive(Debug, Clone, Default)]
pub struct NullGraphClient;

#[async_trait]
impl CodeGraphClient for NullGraphClient {
    async fn get_file_symbols(&self, _file: &str) -> Result<Vec<GraphNode>, GraphError> {
        Ok(vec![])
    }

    async fn search_symbols(
        &self,
        _opts: SymbolSearchOptions,
    ) -> Result<(Vec<GraphNode>, usize), GraphError> {
        Ok((vec![], 0))
    }

    async fn get_callers(&self, _qname: &str, _depth: u32) -> Result<Vec<GraphNode>, GraphError> {
        Ok(vec![])
    }

    async fn get_callees(&self, _qname: &str, _depth: u32) -> Result<Vec<GraphNode>, GraphError> {
        Ok(vec![])
    }

    async fn get_methods(&self, _qname: &str) -> Result<Vec<GraphNode>, GraphError> {
        Ok(vec![])
    }

    async fn get_implementations(&self, _qname: &str) -> Result<Vec<GraphNode>, GraphError> {
        Ok(vec![])
    }

    async fn get_usages(&self, _qname: &str) -> Result<Vec<GraphNode>, GraphError> {
        Ok(vec![])
    }

    async fn get_inheritors(&self, _qname: &str) -> Result<Vec<GraphNode>, GraphError> {
        Ok(vec![])
    }
}
