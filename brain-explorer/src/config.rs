use std::time::Duration;

use crate::prompts::PromptTemplates;

/// Explorer-session-wide knobs that are policy, not contract (§4.2, §5).
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Concurrency cap for the Explorer → Tool fan-out (§5: `maxParallelTools = 4`).
    pub max_parallel_tools: usize,
    /// Length of the doom-loop sliding window (§3, §4.2: `doomLoopThreshold = 3`).
    pub doom_loop_threshold: usize,
    /// Cancellable session deadline (§4.2, §5: default 12 minutes).
    pub deadline: Duration,
    pub prompts: PromptTemplates,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_parallel_tools: 4,
            doom_loop_threshold: 3,
            deadline: Duration::from_secs(12 * 60),
            prompts: PromptTemplates::default(),
        }
    }
}
