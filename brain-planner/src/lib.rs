//! The Planner outer agent (§4.4): drives the conversation, fans exploration queries
//! out to Explorer sub-agents, and terminates the session on `submit_actions`.

mod config;
mod schema;

pub use config::PlannerConfig;

use std::collections::HashMap;
use std::time::Duration;

use brain_dispatch::dispatch;
use brain_explorer::{Explorer, ExplorerConfig};
use brain_tool::ToolRegistry;
use brain_types::{
    Action, LlmClient, Message, PlannerMetrics, PlannerOutput, Thoroughness, ToolSchema,
};
use tokio_util::sync::CancellationToken;

/// Drives one Planner.Plan invocation. Generic over the LLM client, which must be
/// `Clone` so the Planner can hand an owned copy to each Explorer sub-agent it spawns
/// via the bounded dispatcher (§9 "Cyclic agent/tool references": composition, no
/// back-reference from Explorer to Planner).
pub struct Planner<L: LlmClient + Clone + 'static> {
    llm: L,
    toolbelt: ToolRegistry,
    explorer_config: ExplorerConfig,
    config: PlannerConfig,
}

impl<L: LlmClient + Clone + 'static> Planner<L> {
    pub fn new(
        llm: L,
        toolbelt: ToolRegistry,
        explorer_config: ExplorerConfig,
        config: PlannerConfig,
    ) -> Self {
        Self {
            llm,
            toolbelt,
            explorer_config,
            config,
        }
    }

    /// Runs the outer loop of §4.4 to completion. `session_id` seeds both Planner
    /// metrics and the session-id prefix handed to each spawned Explorer.
    pub async fn plan(
        &self,
        session_id: impl Into<String>,
        mut messages: Vec<Message>,
        cancel: CancellationToken,
    ) -> (PlannerOutput, PlannerMetrics) {
        let session_id = session_id.into();
        let start = std::time::Instant::now();

        if messages.is_empty() {
            let output = PlannerOutput {
                actions: Vec::new(),
                reasoning: String::new(),
                messages: Vec::new(),
                submit_actions_call_id: None,
            };
            let metrics = empty_metrics(session_id, start.elapsed());
            return (output, metrics);
        }

        let tool_schemas: Vec<ToolSchema> = schema::planner_tool_schemas();
        let mut iterations: u32 = 0;
        let mut prompt_tokens: u64 = 0;
        let mut completion_tokens: u64 = 0;
        let mut locate_calls: u32 = 0;
        let mut analyze_calls: u32 = 0;
        let mut explore_warning_sent = false;
        let mut explore_index: u32 = 0;

        loop {
            iterations += 1;
            if cancel.is_cancelled() {
                let output = PlannerOutput {
                    actions: Vec::new(),
                    reasoning: "Error: planning session was cancelled".to_string(),
                    messages: messages.clone(),
                    submit_actions_call_id: None,
                };
                let metrics = self.build_metrics(
                    session_id,
                    start.elapsed(),
                    iterations,
                    prompt_tokens,
                    completion_tokens,
                    locate_calls,
                    analyze_calls,
                    &output.actions,
                );
                return (output, metrics);
            }

            let response = match self.llm.chat_with_tools(&messages, &tool_schemas).await {
                Ok(r) => r,
                Err(e) => {
                    let output = PlannerOutput {
                        actions: Vec::new(),
                        reasoning: format!("Error: model call failed: {e}"),
                        messages: messages.clone(),
                        submit_actions_call_id: None,
                    };
                    let metrics = self.build_metrics(
                        session_id,
                        start.elapsed(),
                        iterations,
                        prompt_tokens,
                        completion_tokens,
                        locate_calls,
                        analyze_calls,
                        &output.actions,
                    );
                    return (output, metrics);
                }
            };
            prompt_tokens += response.prompt_tokens;
            completion_tokens += response.completion_tokens;

            if let Some(submit_call) = response
                .tool_calls
                .iter()
                .find(|c| c.name == "submit_actions")
            {
                let (actions, reasoning) = parse_submit_actions(&submit_call.arguments);
                tracing::info!(
                    session_id = %session_id,
                    iterations,
                    action_count = actions.len(),
                    "planner.submit_actions"
                );
                messages.push(Message::assistant_with_calls(
                    response.content.clone(),
                    response.tool_calls.clone(),
                ));
                let output = PlannerOutput {
                    actions: actions.clone(),
                    reasoning,
                    messages,
                    submit_actions_call_id: Some(submit_call.id.clone()),
                };
                let metrics = self.build_metrics(
                    session_id,
                    start.elapsed(),
                    iterations,
                    prompt_tokens,
                    completion_tokens,
                    locate_calls,
                    analyze_calls,
                    &output.actions,
                );
                return (output, metrics);
            }

            if response.tool_calls.is_empty() {
                let output = PlannerOutput {
                    actions: Vec::new(),
                    reasoning: response.content,
                    messages,
                    submit_actions_call_id: None,
                };
                let metrics = self.build_metrics(
                    session_id,
                    start.elapsed(),
                    iterations,
                    prompt_tokens,
                    completion_tokens,
                    locate_calls,
                    analyze_calls,
                    &output.actions,
                );
                return (output, metrics);
            }

            for call in &response.tool_calls {
                match call.name.as_str() {
                    "locate" => locate_calls += 1,
                    "analyze" => analyze_calls += 1,
                    _ => {}
                }
            }
            explore_index += response.tool_calls.len() as u32;

            let llm = self.llm.clone();
            let toolbelt = self.toolbelt.clone();
            let explorer_config = self.explorer_config.clone();
            let session_prefix = session_id.clone();
            let cap = self.config.max_parallel_explorers;
            let explore_cancel = cancel.clone();
            let results = dispatch(
                response.tool_calls.clone(),
                cap,
                move |i, call| {
                    let llm = llm.clone();
                    let toolbelt = toolbelt.clone();
                    let explorer_config = explorer_config.clone();
                    let session_id = format!("{session_prefix}-{i}");
                    let cancel = explore_cancel.clone();
                    async move {
                        run_explore_call(llm, toolbelt, explorer_config, session_id, call, cancel)
                            .await
                    }
                },
            )
            .await;

            messages.push(Message::assistant_with_calls(
                response.content,
                response.tool_calls.clone(),
            ));
            for (call, result) in response.tool_calls.iter().zip(results.into_iter()) {
                messages.push(Message::tool_result(call.id.clone(), result));
            }

            if !explore_warning_sent && explore_index > self.config.explore_call_warning_threshold
            {
                tracing::debug!(session_id = %session_id, explore_index, "planner.explore_warning_sent");
                messages.push(Message::user(self.config.explore_warning.clone()));
                explore_warning_sent = true;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_metrics(
        &self,
        session_id: String,
        duration: Duration,
        iterations: u32,
        prompt_tokens: u64,
        completion_tokens: u64,
        locate_calls: u32,
        analyze_calls: u32,
        actions: &[Action],
    ) -> PlannerMetrics {
        let mut action_counts: HashMap<String, u32> = HashMap::new();
        let mut gaps_opened = 0u32;
        let mut gaps_closed = 0u32;
        let mut gaps_closed_by_reason: HashMap<String, u32> = HashMap::new();
        let mut learnings_added = 0u32;
        let mut findings_added = 0u32;
        let mut reached_spec_generation = false;

        for action in actions {
            *action_counts.entry(action_tag(action).to_string()).or_insert(0) += 1;
            match action {
                Action::UpdateGaps(data) => {
                    gaps_opened += data.add.len() as u32;
                    gaps_closed += data.close.len() as u32;
                    for close in &data.close {
                        let reason = format!("{:?}", close.reason);
                        *gaps_closed_by_reason.entry(reason).or_insert(0) += 1;
                    }
                }
                Action::UpdateLearnings(data) => learnings_added += data.propose.len() as u32,
                Action::UpdateFindings(data) => findings_added += data.add.len() as u32,
                Action::ReadyForSpecGeneration(_) => reached_spec_generation = true,
                _ => {}
            }
        }

        PlannerMetrics {
            session_id,
            duration,
            iterations,
            prompt_tokens,
            completion_tokens,
            action_counts,
            gaps_opened,
            gaps_closed,
            gaps_closed_by_reason,
            learnings_added,
            findings_added,
            reached_spec_generation,
            locate_calls,
            analyze_calls,
        }
    }
}

fn action_tag(action: &Action) -> &'static str {
    match action {
        Action::PostComment(_) => "post_comment",
        Action::UpdateFindings(_) => "update_findings",
        Action::UpdateGaps(_) => "update_gaps",
        Action::UpdateLearnings(_) => "update_learnings",
        Action::ReadyForSpecGeneration(_) => "ready_for_spec_generation",
        Action::UpdateSpec(_) => "update_spec",
        Action::SetSpecStatus(_) => "set_spec_status",
    }
}

fn empty_metrics(session_id: String, duration: Duration) -> PlannerMetrics {
    PlannerMetrics {
        session_id,
        duration,
        iterations: 0,
        prompt_tokens: 0,
        completion_tokens: 0,
        action_counts: HashMap::new(),
        gaps_opened: 0,
        gaps_closed: 0,
        gaps_closed_by_reason: HashMap::new(),
        learnings_added: 0,
        findings_added: 0,
        reached_spec_generation: false,
        locate_calls: 0,
        analyze_calls: 0,
    }
}

/// Parses a `submit_actions` payload into an ordered action list and its reasoning
/// string (§4.4, §8 "Actions round-trip"). An unparseable `actions[*].type` — i.e. one
/// outside the closed enum in §3 — drops that entry rather than failing the whole
/// batch, since the Planner loop still must terminate on this call regardless.
fn parse_submit_actions(raw_arguments: &str) -> (Vec<Action>, String) {
    let value: serde_json::Value = match serde_json::from_str(raw_arguments) {
        Ok(v) => v,
        Err(_) => return (Vec::new(), String::new()),
    };
    let reasoning = value
        .get("reasoning")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    let actions = value
        .get("actions")
        .and_then(serde_json::Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| serde_json::from_value::<Action>(v.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    (actions, reasoning)
}

async fn run_explore_call(
    llm: impl LlmClient + 'static,
    toolbelt: ToolRegistry,
    explorer_config: ExplorerConfig,
    session_id: String,
    call: brain_types::ToolCall,
    cancel: CancellationToken,
) -> String {
    let thoroughness = match call.name.as_str() {
        "locate" => Thoroughness::Quick,
        "analyze" => Thoroughness::Medium,
        other => return format!("Explore error: unknown exploration tool: {other}"),
    };
    let query = match serde_json::from_str::<serde_json::Value>(&call.arguments)
        .ok()
        .and_then(|v| v.get("query").and_then(|q| q.as_str()).map(str::to_string))
    {
        Some(q) => q,
        None => return "Explore error: missing query argument".to_string(),
    };

    let explorer = Explorer::new(llm, toolbelt, explorer_config);
    let outcome = explorer.explore(session_id, &query, thoroughness, cancel).await;
    outcome.report
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_types::{AgentResponse, ModelError, ToolCall};

    #[derive(Clone)]
    struct ScriptedLlm {
        responses: std::sync::Arc<std::sync::Mutex<std::collections::VecDeque<AgentResponse>>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<AgentResponse>) -> Self {
            Self {
                responses: std::sync::Arc::new(std::sync::Mutex::new(responses.into())),
            }
        }
    }

    impl LlmClient for ScriptedLlm {
        fn chat_with_tools(
            &self,
            _messages: &[Message],
            _tools: &[ToolSchema],
        ) -> impl std::future::Future<Output = Result<AgentResponse, ModelError>> + Send {
            let next = self.responses.lock().unwrap().pop_front();
            async move {
                next.ok_or_else(|| ModelError::RequestFailed("script exhausted".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn submit_actions_terminates_with_one_action() {
        let call_args = serde_json::json!({
            "actions": [{"type": "post_comment", "data": {"content": "hi"}}],
            "reasoning": "ok"
        })
        .to_string();
        let llm = ScriptedLlm::new(vec![AgentResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call_1".into(),
                name: "submit_actions".into(),
                arguments: call_args,
            }],
            prompt_tokens: 10,
            completion_tokens: 5,
        }]);
        let planner = Planner::new(
            llm,
            ToolRegistry::new(),
            ExplorerConfig::default(),
            PlannerConfig::default(),
        );
        let (output, metrics) = planner
            .plan("p1", vec![Message::user("hello")], CancellationToken::new())
            .await;

        assert_eq!(output.actions.len(), 1);
        assert_eq!(output.submit_actions_call_id.as_deref(), Some("call_1"));
        assert_eq!(metrics.iterations, 1);
    }

    #[tokio::test]
    async fn empty_input_returns_immediately_with_no_actions() {
        let llm = ScriptedLlm::new(vec![]);
        let planner = Planner::new(
            llm,
            ToolRegistry::new(),
            ExplorerConfig::default(),
            PlannerConfig::default(),
        );
        let (output, metrics) = planner.plan("p2", vec![], CancellationToken::new()).await;
        assert!(output.actions.is_empty());
        assert_eq!(metrics.iterations, 0);
    }

    #[tokio::test]
    async fn no_tool_calls_returns_reasoning_with_no_actions() {
        let llm = ScriptedLlm::new(vec![AgentResponse {
            content: "I have nothing to do.".to_string(),
            tool_calls: vec![],
            prompt_tokens: 5,
            completion_tokens: 5,
        }]);
        let planner = Planner::new(
            llm,
            ToolRegistry::new(),
            ExplorerConfig::default(),
            PlannerConfig::default(),
        );
        let (output, _metrics) = planner
            .plan("p3", vec![Message::user("hello")], CancellationToken::new())
            .await;
        assert!(output.actions.is_empty());
        assert_eq!(output.reasoning, "I have nothing to do.");
    }
}
