use std::path::{Path, PathBuf};

use brain_tool::{ToolDyn, ToolFuture};
use serde_json::Value;

use crate::sandbox::{resolve_within_repo, PATH_OUTSIDE_REPO};

const DEFAULT_DEPTH: u64 = 2;
const MAX_DEPTH: u64 = 4;
const ENTRY_CAP: usize = 200;
const NOISE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "__pycache__",
    ".next",
    "dist",
    "build",
    ".idea",
    ".vscode",
    ".cache",
    "coverage",
    ".turbo",
    "target",
];

/// `tree(path?, depth?)` — directory view (§4.1).
pub struct TreeTool {
    pub repo_root: PathBuf,
}

impl ToolDyn for TreeTool {
    fn name(&self) -> &str {
        "tree"
    }

    fn description(&self) -> &str {
        "Show a directory tree rooted at a path within the repository."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "depth": {"type": "integer"}
            }
        })
    }

    fn call(&self, input: Value) -> ToolFuture<'_> {
        let repo_root = self.repo_root.clone();
        Box::pin(async move { run_tree(&repo_root, input).await })
    }
}

async fn run_tree(repo_root: &Path, input: Value) -> Result<String, brain_tool::ToolError> {
    let path = input.get("path").and_then(Value::as_str).unwrap_or(".");
    let depth = input
        .get("depth")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_DEPTH)
        .min(MAX_DEPTH)
        .max(1);

    if Path::new(path).is_absolute() {
        return Ok(PATH_OUTSIDE_REPO.to_string());
    }
    let root = match resolve_within_repo(repo_root, path) {
        Ok(p) => p,
        Err(_) => return Ok(PATH_OUTSIDE_REPO.to_string()),
    };

    let mut lines = Vec::new();
    let mut count = 0usize;
    let mut truncated = false;
    walk(&root, 0, depth, &mut lines, &mut count, &mut truncated);

    if truncated {
        lines.push(format!("... (truncated at {ENTRY_CAP} entries)"));
    }
    Ok(lines.join("\n"))
}

fn walk(
    dir: &Path,
    current_depth: u64,
    max_depth: u64,
    lines: &mut Vec<String>,
    count: &mut usize,
    truncated: &mut bool,
) {
    if *truncated || current_depth >= max_depth {
        return;
    }
    let Ok(read_dir) = std::fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = read_dir.filter_map(Result::ok).collect();
    entries.sort_by(|a, b| {
        let a_is_dir = a.path().is_dir();
        let b_is_dir = b.path().is_dir();
        match (a_is_dir, b_is_dir) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.file_name().cmp(&b.file_name()),
        }
    });

    for entry in entries {
        if *count >= ENTRY_CAP {
            *truncated = true;
            return;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if NOISE_DIRS.contains(&name.as_str()) {
            continue;
        }
        let indent = "  ".repeat(current_depth as usize);
        let is_dir = entry.path().is_dir();
        if is_dir {
            lines.push(format!("{indent}{name}/"));
        } else {
            lines.push(format!("{indent}{name}"));
        }
        *count += 1;
        if is_dir {
            walk(&entry.path(), current_depth + 1, max_depth, lines, count, truncated);
        }
    }
}
