/// Wording used by the control loop. The contract (§4.2) doesn't depend on exact
/// phrasing, only on *when* each prompt fires — §9 flags the wording itself as an open
/// question and asks that implementations make it configurable rather than hard-coded.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub system_prompt: String,
    pub soft_nudge: String,
    pub self_assessment_request: String,
    pub iteration_limit_synthesis: String,
    pub hard_limit_synthesis: String,
    pub doom_loop_synthesis: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system_prompt: "You are a code exploration agent. Use the available tools to \
                gather evidence, then answer the user's question as a concise, \
                evidence-bearing prose report."
                .to_string(),
            soft_nudge: "You are approaching your exploration budget. Wrap up and prepare \
                to synthesize your findings soon."
                .to_string(),
            self_assessment_request: "Rate your confidence (high/medium/low) and note caveats."
                .to_string(),
            iteration_limit_synthesis: "Maximum exploration steps reached. Summarize what \
                you've found so far as your final answer."
                .to_string(),
            hard_limit_synthesis: "Token limit reached. Summarize what you've found so far \
                as your final answer."
                .to_string(),
            doom_loop_synthesis: "You appear to be repeating the same tool call. Stop and \
                summarize what you've found so far as your final answer."
                .to_string(),
        }
    }
}
