use std::path::PathBuf;
use std::process::Stdio;

use brain_tool::{ToolDyn, ToolFuture};
use serde_json::Value;
use tokio::process::Command;

const MAX_RESULTS: usize = 50;

/// `glob(pattern)` — filename glob, in-process first then an external find-by-glob
/// fallback (§4.1).
pub struct GlobTool {
    pub repo_root: PathBuf,
}

impl ToolDyn for GlobTool {
    fn name(&self) -> &str {
        "glob"
    }

    fn description(&self) -> &str {
        "Find files by glob pattern."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {"pattern": {"type": "string"}},
            "required": ["pattern"]
        })
    }

    fn call(&self, input: Value) -> ToolFuture<'_> {
        let repo_root = self.repo_root.clone();
        Box::pin(async move { run_glob(&repo_root, input).await })
    }
}

async fn run_glob(repo_root: &std::path::Path, input: Value) -> Result<String, brain_tool::ToolError> {
    let Some(pattern) = input.get("pattern").and_then(Value::as_str) else {
        return Ok("Error: pattern is required".to_string());
    };

    let mut matches = in_process_glob(repo_root, pattern);
    if matches.is_empty() {
        matches = external_find(repo_root, pattern).await;
    }

    if matches.is_empty() {
        return Ok(format!("No files found matching pattern: {pattern}"));
    }
    matches.truncate(MAX_RESULTS);
    Ok(matches.join("\n"))
}

fn in_process_glob(repo_root: &std::path::Path, pattern: &str) -> Vec<String> {
    let full_pattern = repo_root.join(pattern);
    let Some(pattern_str) = full_pattern.to_str() else {
        return Vec::new();
    };
    let Ok(paths) = glob::glob(pattern_str) else {
        return Vec::new();
    };
    paths
        .filter_map(Result::ok)
        .filter_map(|p| relative_to(repo_root, &p))
        .collect()
}

async fn external_find(repo_root: &std::path::Path, pattern: &str) -> Vec<String> {
    let output = Command::new("find")
        .current_dir(repo_root)
        .arg(".")
        .arg("-iname")
        .arg(pattern)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;
    let Ok(output) = output else {
        return Vec::new();
    };
    if !output.status.success() {
        return Vec::new();
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim_start_matches("./").to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

fn relative_to(repo_root: &std::path::Path, path: &std::path::Path) -> Option<String> {
    path.strip_prefix(repo_root)
        .ok()
        .map(|p| p.to_string_lossy().to_string())
}
