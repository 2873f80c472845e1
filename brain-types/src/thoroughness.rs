use serde::{Deserialize, Serialize};

/// Explorer thoroughness dimension (§3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Thoroughness {
    Quick,
    Medium,
    Thorough,
}

/// Per-thoroughness iteration and token budget.
///
/// Invariant: `hard_token_limit > soft_token_target >= 0` (§3 Invariants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetPolicy {
    pub max_iterations: u32,
    pub soft_token_target: u64,
    pub hard_token_limit: u64,
}

impl BudgetPolicy {
    pub const fn new(max_iterations: u32, soft_token_target: u64, hard_token_limit: u64) -> Self {
        Self {
            max_iterations,
            soft_token_target,
            hard_token_limit,
        }
    }
}

impl Thoroughness {
    /// Default policy for this level, within the ranges given in §4.2's table.
    pub const fn default_budget(self) -> BudgetPolicy {
        match self {
            Thoroughness::Quick => BudgetPolicy::new(12, 18_000, 30_000),
            Thoroughness::Medium => BudgetPolicy::new(30, 40_000, 70_000),
            Thoroughness::Thorough => BudgetPolicy::new(75, 90_000, 130_000),
        }
    }
}
