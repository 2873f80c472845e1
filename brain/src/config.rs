use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BrainError;

/// Optional per-level overrides of [`brain_types::Thoroughness::default_budget`].
///
/// Stored and validated here; not yet threaded into `Explorer::explore`, whose public
/// API fixes budgets to the thoroughness level alone (see DESIGN.md).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThoroughnessOverrides {
    pub quick: Option<BudgetOverride>,
    pub medium: Option<BudgetOverride>,
    pub thorough: Option<BudgetOverride>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetOverride {
    pub max_iterations: u32,
    pub soft_token_target: u64,
    pub hard_token_limit: u64,
}

/// Process-wide configuration for the CLI driver (§10.4).
///
/// Loaded from a JSON file (default `brain.json`) or built with defaults; the
/// `BRAIN_DEBUG_DIR` override lives in [`crate::debug::DebugWriter`], read once at
/// construction rather than here, since it is process-global state (§9).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub repo_root: PathBuf,
    pub state_dir: PathBuf,
    pub max_parallel_tools: usize,
    pub max_parallel_explorers: usize,
    pub doom_loop_threshold: usize,
    pub thoroughness_overrides: ThoroughnessOverrides,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            state_dir: PathBuf::from(".brain-state"),
            max_parallel_tools: 4,
            max_parallel_explorers: 3,
            doom_loop_threshold: 3,
            thoroughness_overrides: ThoroughnessOverrides::default(),
        }
    }
}

impl BrainConfig {
    pub fn from_path(path: &Path) -> Result<Self, BrainError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }
}
