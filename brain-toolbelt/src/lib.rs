//! The Explorer's code-exploration toolbelt (§4.1): search, glob, read, tree, graph,
//! each sandboxed to a repository root.

mod sandbox;
mod text;
mod tools;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use brain_tool::ToolRegistry;
use brain_types::CodeGraphClient;

pub use sandbox::{resolve_within_repo, PATH_OUTSIDE_REPO};
pub use tools::{GlobTool, GraphTool, ReadTool, SearchTool, TreeTool};

/// Builds the closed [`ToolRegistry`] exposed to one Explorer session, rooted at a
/// single canonical repository path (§9 "Cyclic agent/tool references" — the Explorer
/// owns this via composition, not the reverse).
pub struct Toolbelt {
    repo_root: PathBuf,
    graph_client: Arc<dyn CodeGraphClient>,
}

impl Toolbelt {
    /// Canonicalizes `repo_root` once; every tool call is sandboxed against this value
    /// for the lifetime of the `Toolbelt`.
    pub fn new(repo_root: &Path, graph_client: Arc<dyn CodeGraphClient>) -> std::io::Result<Self> {
        let repo_root = repo_root.canonicalize()?;
        Ok(Self {
            repo_root,
            graph_client,
        })
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SearchTool {
            repo_root: self.repo_root.clone(),
        }));
        registry.register(Arc::new(GlobTool {
            repo_root: self.repo_root.clone(),
        }));
        registry.register(Arc::new(ReadTool {
            repo_root: self.repo_root.clone(),
        }));
        registry.register(Arc::new(TreeTool {
            repo_root: self.repo_root.clone(),
        }));
        registry.register(Arc::new(GraphTool {
            client: Arc::clone(&self.graph_client),
        }));
        registry
    }
}
