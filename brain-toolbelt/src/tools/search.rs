use std::path::PathBuf;
use std::process::Stdio;

use brain_tool::{ToolDyn, ToolFuture};
use serde_json::Value;
use tokio::process::Command;

use crate::text::truncate_line;

const DEFAULT_LIMIT: u64 = 30;
const MAX_LIMIT: u64 = 50;
const EXCLUDES: &[&str] = &[".git", "node_modules", "vendor", "*.min.js"];

/// `search(pattern, include?, limit?)` — regex content search via an external
/// ripgrep-like CLI (§4.1).
pub struct SearchTool {
    pub repo_root: PathBuf,
}

impl ToolDyn for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Regex content search across the repository."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {"type": "string"},
                "include": {"type": "string"},
                "limit": {"type": "integer"}
            },
            "required": ["pattern"]
        })
    }

    fn call(&self, input: Value) -> ToolFuture<'_> {
        let repo_root = self.repo_root.clone();
        Box::pin(async move { run_search(&repo_root, input).await })
    }
}

async fn run_search(repo_root: &std::path::Path, input: Value) -> Result<String, brain_tool::ToolError> {
    let Some(pattern) = input.get("pattern").and_then(Value::as_str) else {
        return Ok("Error: pattern is required".to_string());
    };
    let include = input.get("include").and_then(Value::as_str);
    let limit = input
        .get("limit")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT)
        .max(1);

    let mut cmd = Command::new("rg");
    cmd.current_dir(repo_root)
        .arg("--line-number")
        .arg("--no-heading")
        .arg("--color=never");
    for exclude in EXCLUDES {
        cmd.arg("-g").arg(format!("!{exclude}"));
    }
    if let Some(include) = include {
        cmd.arg("-g").arg(include);
    }
    cmd.arg(pattern);
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let output = match cmd.output().await {
        Ok(output) => output,
        Err(e) => return Ok(format!("Search error: {e}")),
    };

    match output.status.code() {
        // ripgrep's documented "no matches" exit code; a normal result, not an error.
        Some(1) => Ok(format!("No matches found for pattern: {pattern}")),
        Some(0) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let mut lines: Vec<String> = stdout
                .lines()
                .map(|l| truncate_line(l, 500))
                .take(limit as usize)
                .collect();
            let total = stdout.lines().count();
            if lines.is_empty() {
                return Ok(format!("No matches found for pattern: {pattern}"));
            }
            if total >= limit as usize {
                lines.push(format!("\n(results limited to {limit})"));
            }
            Ok(lines.join("\n"))
        }
        _ => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(format!("Search error: {stderr}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_pattern_is_invalid_args_prose() {
        let repo = tempfile::tempdir().unwrap();
        let result = run_search(repo.path(), serde_json::json!({})).await.unwrap();
        assert_eq!(result, "Error: pattern is required");
    }
}
