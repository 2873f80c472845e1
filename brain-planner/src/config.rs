/// Planner-session-wide knobs (§4.4, §5).
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Concurrency cap for the Planner → Explorer fan-out (§5: `maxParallelExplorers`
    /// is policy in `[2, 4]`).
    pub max_parallel_explorers: usize,
    /// After this many cumulative exploration calls in a session, append a one-shot
    /// soft warning steering the model toward synthesis (§4.4 step 7).
    pub explore_call_warning_threshold: u32,
    pub explore_warning: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_parallel_explorers: 3,
            explore_call_warning_threshold: 3,
            explore_warning: "You've made several exploration calls already. Consider whether \
                you have enough evidence to proceed toward actions."
                .to_string(),
        }
    }
}
