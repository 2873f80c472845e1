use std::sync::Arc;

use brain_tool::{ToolDyn, ToolFuture};
use brain_types::{CodeGraphClient, GraphNode, SymbolSearchOptions};
use serde_json::Value;

const DEFAULT_DEPTH: u64 = 1;
const MAX_DEPTH: u64 = 3;
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "rs", "go", "py", "js", "jsx", "ts", "tsx", "java", "rb", "c", "h", "cc", "cpp", "hpp", "cs",
];

/// `graph(operation, ...)` — semantic query over the external code-graph store (§4.1).
pub struct GraphTool {
    pub client: Arc<dyn CodeGraphClient>,
}

impl ToolDyn for GraphTool {
    fn name(&self) -> &str {
        "graph"
    }

    fn description(&self) -> &str {
        "Query the code graph: symbols, search, callers, callees, implementations, methods, usages, inheritors."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "operation": {"type": "string"},
                "file": {"type": "string"},
                "name": {"type": "string"},
                "kind": {"type": "string"},
                "namespace": {"type": "string"},
                "qname": {"type": "string"},
                "depth": {"type": "integer"}
            },
            "required": ["operation"]
        })
    }

    fn call(&self, input: Value) -> ToolFuture<'_> {
        let client = Arc::clone(&self.client);
        Box::pin(async move { run_graph(client, input).await })
    }
}

async fn run_graph(
    client: Arc<dyn CodeGraphClient>,
    input: Value,
) -> Result<String, brain_tool::ToolError> {
    let Some(operation) = input.get("operation").and_then(Value::as_str) else {
        return Ok("Error: operation is required".to_string());
    };

    match operation {
        "symbols" => {
            let Some(file) = input.get("file").and_then(Value::as_str) else {
                return Ok("Error: file is required for symbols".to_string());
            };
            let Some(ext) = file.rsplit('.').next() else {
                return Ok(unsupported_file_message());
            };
            if !SUPPORTED_EXTENSIONS.contains(&ext) {
                return Ok(unsupported_file_message());
            }
            match client.get_file_symbols(file).await {
                Ok(nodes) => Ok(render_nodes(&nodes)),
                Err(e) => Ok(format!("Graph error: {e}")),
            }
        }
        "search" => {
            let Some(name) = input.get("name").and_then(Value::as_str) else {
                return Ok("Error: name is required for search".to_string());
            };
            let opts = SymbolSearchOptions {
                name: name.to_string(),
                kind: input.get("kind").and_then(Value::as_str).map(str::to_string),
                namespace: input
                    .get("namespace")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                file: input.get("file").and_then(Value::as_str).map(str::to_string),
            };
            match client.search_symbols(opts).await {
                Ok((nodes, total)) => Ok(format!("{} (total: {total})", render_nodes(&nodes))),
                Err(e) => Ok(format!("Graph error: {e}")),
            }
        }
        "callers" | "callees" | "implementations" | "methods" | "usages" | "inheritors" => {
            let Some(qname) = input.get("qname").and_then(Value::as_str) else {
                return Ok("Error: qname is required for relationship queries".to_string());
            };
            let depth = input
                .get("depth")
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_DEPTH)
                .min(MAX_DEPTH)
                .max(1);
            let result = match operation {
                "callers" => client.get_callers(qname, depth as u32).await,
                "callees" => client.get_callees(qname, depth as u32).await,
                "implementations" => client.get_implementations(qname).await,
                "methods" => client.get_methods(qname).await,
                "usages" => client.get_usages(qname).await,
                "inheritors" => client.get_inheritors(qname).await,
                _ => unreachable!(),
            };
            match result {
                Ok(nodes) => Ok(render_nodes(&nodes)),
                Err(e) => Ok(format!("Graph error: {e}")),
            }
        }
        other => Ok(format!("Error: unknown graph operation: {other}")),
    }
}

fn unsupported_file_message() -> String {
    "Error: unsupported file type for symbols; try search or read instead".to_string()
}

fn render_nodes(nodes: &[GraphNode]) -> String {
    if nodes.is_empty() {
        return "No matching symbols found.".to_string();
    }
    nodes
        .iter()
        .map(|n| {
            let sig = n
                .signature
                .as_deref()
                .map(|s| format!(" {s}"))
                .unwrap_or_default();
            format!(
                "{} ({}) — {}:{}{sig}",
                n.qname, n.kind, n.filepath, n.pos.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use brain_types::GraphError;

    struct StubClient;

    #[async_trait]
    impl CodeGraphClient for StubClient {
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

    #[tokio::test]
    async fn symbols_rejects_unsupported_extension() {
        let result = run_graph(
            Arc::new(StubClient),
            serde_json::json!({"operation": "symbols", "file": "data.bin"}),
        )
        .await
        .unwrap();
        assert!(result.contains("try search or read instead"));
    }

    #[tokio::test]
    async fn relationship_op_requires_qname() {
        let result = run_graph(Arc::new(StubClient), serde_json::json!({"operation": "callers"}))
            .await
            .unwrap();
        assert_eq!(result, "Error: qname is required for relationship queries");
    }
}
