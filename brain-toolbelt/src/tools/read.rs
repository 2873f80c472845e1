use std::path::PathBuf;

use brain_tool::{ToolDyn, ToolFuture};
use serde_json::Value;

use crate::sandbox::{resolve_within_repo, PATH_OUTSIDE_REPO};
use crate::text::truncate_line;

const DEFAULT_NUM_LINES: u64 = 100;
const MAX_NUM_LINES: u64 = 300;

/// `read(file, start_line?, num_lines?)` — bounded file read (§4.1).
pub struct ReadTool {
    pub repo_root: PathBuf,
}

impl ToolDyn for ReadTool {
    fn name(&self) -> &str {
        "read"
    }

    fn description(&self) -> &str {
        "Read a bounded window of lines from a file."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file": {"type": "string"},
                "start_line": {"type": "integer"},
                "num_lines": {"type": "integer"}
            },
            "required": ["file"]
        })
    }

    fn call(&self, input: Value) -> ToolFuture<'_> {
        let repo_root = self.repo_root.clone();
        Box::pin(async move { run_read(&repo_root, input).await })
    }
}

async fn run_read(repo_root: &std::path::Path, input: Value) -> Result<String, brain_tool::ToolError> {
    let Some(file) = input.get("file").and_then(Value::as_str) else {
        return Ok("Error: file is required".to_string());
    };
    let start_line = input.get("start_line").and_then(Value::as_u64).unwrap_or(1).max(1);
    let num_lines = input
        .get("num_lines")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_NUM_LINES)
        .min(MAX_NUM_LINES)
        .max(1);

    let resolved = match resolve_within_repo(repo_root, file) {
        Ok(p) => p,
        Err(_) => return Ok(PATH_OUTSIDE_REPO.to_string()),
    };

    let content = match tokio::fs::read_to_string(&resolved).await {
        Ok(c) => c,
        Err(e) => return Ok(format!("Error: could not read file: {e}")),
    };

    let lines: Vec<&str> = content.lines().collect();
    let start_idx = (start_line - 1) as usize;
    if start_idx >= lines.len() {
        return Ok(format!(
            "## {file} (lines {start_line}-{start_line})\n```\n(no lines in range; file has {} lines)\n```",
            lines.len()
        ));
    }
    let end_idx = (start_idx + num_lines as usize).min(lines.len());
    let end_line = end_idx as u64;

    let mut body = String::new();
    for (offset, line) in lines[start_idx..end_idx].iter().enumerate() {
        let line_no = start_line + offset as u64;
        body.push_str(&format!("{line_no:04}: {}\n", truncate_line(line, 500)));
    }

    Ok(format!("## {file} (lines {start_line}-{end_line})\n```\n{body}```"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_requested_window() {
        let repo = tempfile::tempdir().unwrap();
        let content: String = (1..=10).map(|i| format!("line{i}\n")).collect();
        std::fs::write(repo.path().join("a.txt"), content).unwrap();

        let result = run_read(
            repo.path(),
            serde_json::json!({"file": "a.txt", "start_line": 3, "num_lines": 2}),
        )
        .await
        .unwrap();

        assert!(result.contains("## a.txt (lines 3-4)"));
        assert!(result.contains("0003: line3"));
        assert!(result.contains("0004: line4"));
        assert!(!result.contains("line5"));
    }

    #[tokio::test]
    async fn rejects_absolute_path() {
        let repo = tempfile::tempdir().unwrap();
        let result = run_read(repo.path(), serde_json::json!({"file": "/etc/passwd"}))
            .await
            .unwrap();
        assert_eq!(result, PATH_OUTSIDE_REPO);
    }

    #[tokio::test]
    async fn rejects_sibling_prefix_escape() {
        let repo = tempfile::tempdir().unwrap();
        let result = run_read(
            repo.path(),
            serde_json::json!({"file": "../sibling-evil/secret.txt"}),
        )
        .await
        .unwrap();
        assert_eq!(result, PATH_OUTSIDE_REPO);
    }
}
