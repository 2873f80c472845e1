//! The Explorer sub-agent (§4.2): a disposable tool-using loop that answers one
//! natural-language code question with an evidence-bearing prose report.

mod confidence;
mod config;
mod prompts;

pub use config::ExplorerConfig;
pub use prompts::PromptTemplates;

use std::collections::{HashMap, VecDeque};

use brain_tool::ToolRegistry;
use brain_types::{
    normalize_tool_args, AgentResponse, Confidence, ExploreMetrics, LlmClient, Message,
    TerminationReason, Thoroughness, ToolCallRecord, ToolSchema,
};
use tokio_util::sync::CancellationToken;

/// The Explorer's answer plus the metrics recorded while producing it.
#[derive(Debug, Clone)]
pub struct ExploreOutcome {
    pub report: String,
    pub metrics: ExploreMetrics,
}

/// Runs the control loop of §4.2, generic over the LLM client so callers can supply a
/// stub in tests without an `Arc<dyn _>` indirection (§9 "Cyclic agent/tool references":
/// composition, not inheritance).
pub struct Explorer<L: LlmClient> {
    llm: L,
    tools: ToolRegistry,
    config: ExplorerConfig,
}

enum RaceOutcome<T> {
    Completed(T),
    Cancelled,
    DeadlineExceeded,
}

async fn race<T>(
    fut: impl std::future::Future<Output = T>,
    cancel: &CancellationToken,
    deadline_at: tokio::time::Instant,
) -> RaceOutcome<T> {
    tokio::select! {
        result = fut => RaceOutcome::Completed(result),
        _ = cancel.cancelled() => RaceOutcome::Cancelled,
        _ = tokio::time::sleep_until(deadline_at) => RaceOutcome::DeadlineExceeded,
    }
}

impl<L: LlmClient> Explorer<L> {
    pub fn new(llm: L, tools: ToolRegistry, config: ExplorerConfig) -> Self {
        Self { llm, tools, config }
    }

    /// Answers `query` at the given `thoroughness`, under `cancel`. `session_id` is
    /// opaque to the Explorer — the caller mints it (e.g. for debug-transcript naming).
    pub async fn explore(
        &self,
        session_id: impl Into<String>,
        query: &str,
        thoroughness: Thoroughness,
        cancel: CancellationToken,
    ) -> ExploreOutcome {
        let session_id = session_id.into();
        let start_time = chrono::Utc::now();
        let start_instant = std::time::Instant::now();
        let deadline_at = tokio::time::Instant::now() + self.config.deadline;
        let budget = thoroughness.default_budget();

        let mut messages = vec![
            Message::system(self.config.prompts.system_prompt.clone()),
            Message::user(query.to_string()),
        ];
        let tool_schemas = self.tool_schemas();

        let mut iteration: u32 = 0;
        let mut soft_nudge_sent = false;
        let mut hit_soft_limit = false;
        let mut current_context_tokens: u64 = 0;
        let mut cumulative_completion_tokens: u64 = 0;
        let mut pending_report: Option<String> = None;
        let mut tool_call_counts: HashMap<String, u32> = HashMap::new();
        let mut doom_window: VecDeque<ToolCallRecord> =
            VecDeque::with_capacity(self.config.doom_loop_threshold);

        let outcome = 'session: loop {
            iteration += 1;

            // Step 1: iteration cap.
            if iteration > budget.max_iterations {
                tracing::debug!(session_id = %session_id, iteration, "explorer.iteration_limit");
                let content = self
                    .forced_synthesis(
                        &mut messages,
                        &self.config.prompts.iteration_limit_synthesis.clone(),
                        &cancel,
                        deadline_at,
                        &mut cumulative_completion_tokens,
                    )
                    .await;
                break 'session Outcome {
                    report: content.unwrap_or_default(),
                    termination_reason: TerminationReason::IterationLimit,
                    confidence: Confidence::Unknown,
                    hit_hard_limit: false,
                    doom_loop_detected: false,
                };
            }

            // Step 2: soft-target nudge (based on the *previous* call's context size).
            if !soft_nudge_sent
                && current_context_tokens as f64 > 0.8 * budget.soft_token_target as f64
            {
                messages.push(Message::user(self.config.prompts.soft_nudge.clone()));
                soft_nudge_sent = true;
                hit_soft_limit = true;
            }

            // Step 3: invoke the model with the full tool-set.
            let response = match race(
                self.llm.chat_with_tools(&messages, &tool_schemas),
                &cancel,
                deadline_at,
            )
            .await
            {
                RaceOutcome::Completed(Ok(r)) => r,
                RaceOutcome::Completed(Err(e)) => {
                    break 'session Outcome {
                        report: format!("Error: model call failed: {e}"),
                        termination_reason: TerminationReason::Error,
                        confidence: Confidence::Unknown,
                        hit_hard_limit: false,
                        doom_loop_detected: false,
                    };
                }
                RaceOutcome::Cancelled | RaceOutcome::DeadlineExceeded => {
                    break 'session Outcome {
                        report: pending_report.clone().unwrap_or_else(|| {
                            "Error: exploration session was cancelled".to_string()
                        }),
                        termination_reason: TerminationReason::Error,
                        confidence: Confidence::Unknown,
                        hit_hard_limit: false,
                        doom_loop_detected: false,
                    };
                }
            };
            current_context_tokens = response.prompt_tokens;
            cumulative_completion_tokens += response.completion_tokens;

            // Step 4: hard limit.
            if current_context_tokens >= budget.hard_token_limit {
                tracing::debug!(
                    session_id = %session_id,
                    current_context_tokens,
                    hard_token_limit = budget.hard_token_limit,
                    "explorer.hard_limit"
                );
                let content = self
                    .forced_synthesis(
                        &mut messages,
                        &self.config.prompts.hard_limit_synthesis.clone(),
                        &cancel,
                        deadline_at,
                        &mut cumulative_completion_tokens,
                    )
                    .await;
                break 'session Outcome {
                    report: content.unwrap_or_default(),
                    termination_reason: TerminationReason::HardLimit,
                    confidence: Confidence::Unknown,
                    hit_hard_limit: true,
                    doom_loop_detected: false,
                };
            }

            // Step 5: no tool calls — either request self-assessment or conclude.
            if response.tool_calls.is_empty() {
                if pending_report.is_none() {
                    pending_report = Some(response.content.clone());
                    messages.push(Message::assistant(response.content));
                    messages.push(Message::user(
                        self.config.prompts.self_assessment_request.clone(),
                    ));
                    continue;
                }
                let confidence = confidence::parse_confidence(&response.content);
                let report = format!(
                    "{}\n\n---\n\n**Confidence Assessment:** {}",
                    pending_report.unwrap_or_default(),
                    response.content
                );
                break 'session Outcome {
                    report,
                    termination_reason: TerminationReason::Natural,
                    confidence,
                    hit_hard_limit: false,
                    doom_loop_detected: false,
                };
            }

            // Step 6: doom-loop detection over single-tool-call turns.
            for call in &response.tool_calls {
                *tool_call_counts.entry(call.name.clone()).or_insert(0) += 1;
            }
            if response.tool_calls.len() == 1 {
                let call = &response.tool_calls[0];
                let record = ToolCallRecord {
                    name: call.name.clone(),
                    normalized_args: normalize_tool_args(&call.arguments),
                };
                if doom_window.len() == self.config.doom_loop_threshold {
                    doom_window.pop_front();
                }
                doom_window.push_back(record);
                if doom_window.len() == self.config.doom_loop_threshold
                    && doom_window.iter().all(|r| r == doom_window.front().unwrap())
                {
                    tracing::warn!(session_id = %session_id, tool = %call.name, "explorer.doom_loop_detected");
                    let content = self
                        .forced_synthesis(
                            &mut messages,
                            &self.config.prompts.doom_loop_synthesis.clone(),
                            &cancel,
                            deadline_at,
                            &mut cumulative_completion_tokens,
                        )
                        .await;
                    break 'session Outcome {
                        report: content.unwrap_or_default(),
                        termination_reason: TerminationReason::DoomLoop,
                        confidence: Confidence::Unknown,
                        hit_hard_limit: false,
                        doom_loop_detected: true,
                    };
                }
            } else {
                doom_window.clear();
            }

            // Step 7: append assistant turn, fan out tool execution, append results.
            messages.push(Message::assistant_with_calls(
                response.content,
                response.tool_calls.clone(),
            ));

            let tools = self.tools.clone();
            let cap = self.config.max_parallel_tools;
            let dispatch_fut =
                brain_dispatch::dispatch(response.tool_calls.clone(), cap, move |_i, call| {
                    let tools = tools.clone();
                    async move { run_tool_call(&tools, call).await }
                });

            match race(dispatch_fut, &cancel, deadline_at).await {
                RaceOutcome::Completed(results) => {
                    for (call, result) in response.tool_calls.iter().zip(results.into_iter()) {
                        messages.push(Message::tool_result(call.id.clone(), result));
                    }
                }
                RaceOutcome::Cancelled | RaceOutcome::DeadlineExceeded => {
                    for call in &response.tool_calls {
                        messages.push(Message::tool_result(
                            call.id.clone(),
                            "Error: session cancelled".to_string(),
                        ));
                    }
                    break 'session Outcome {
                        report: pending_report.unwrap_or_else(|| {
                            "Error: exploration session was cancelled".to_string()
                        }),
                        termination_reason: TerminationReason::Error,
                        confidence: Confidence::Unknown,
                        hit_hard_limit: false,
                        doom_loop_detected: false,
                    };
                }
            }
        };

        let end_time = chrono::Utc::now();
        tracing::info!(
            session_id = %session_id,
            iterations = iteration,
            termination_reason = ?outcome.termination_reason,
            "explorer.session_complete"
        );
        let metrics = ExploreMetrics {
            session_id,
            query: query.to_string(),
            thoroughness,
            start_time,
            end_time,
            duration: start_instant.elapsed(),
            iterations: iteration,
            final_context_tokens: current_context_tokens,
            cumulative_completion_tokens,
            tool_call_counts,
            confidence: outcome.confidence,
            hit_soft_limit,
            hit_hard_limit: outcome.hit_hard_limit,
            doom_loop_detected: outcome.doom_loop_detected,
            final_report_length: outcome.report.len(),
            termination_reason: outcome.termination_reason,
        };

        ExploreOutcome {
            report: outcome.report,
            metrics,
        }
    }

    /// §4.2 "Forced synthesis": append a steering prompt, re-invoke with an empty
    /// tool-set, and return the content. A failure here surfaces as the session's error.
    async fn forced_synthesis(
        &self,
        messages: &mut Vec<Message>,
        prompt: &str,
        cancel: &CancellationToken,
        deadline_at: tokio::time::Instant,
        cumulative_completion_tokens: &mut u64,
    ) -> Option<String> {
        messages.push(Message::user(prompt.to_string()));
        match race(self.llm.chat_with_tools(messages, &[]), cancel, deadline_at).await {
            RaceOutcome::Completed(Ok(response)) => {
                *cumulative_completion_tokens += response.completion_tokens;
                Some(response.content)
            }
            RaceOutcome::Completed(Err(e)) => Some(format!("Error: synthesis failed: {e}")),
            RaceOutcome::Cancelled | RaceOutcome::DeadlineExceeded => {
                Some("Error: synthesis was cancelled".to_string())
            }
        }
    }

    fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .definitions()
            .into_iter()
            .map(|(name, description, schema)| ToolSchema {
                name,
                description,
                parameters_schema: schema,
                strict: None,
            })
            .collect()
    }
}

struct Outcome {
    report: String,
    termination_reason: TerminationReason,
    confidence: Confidence,
    hit_hard_limit: bool,
    doom_loop_detected: bool,
}

async fn run_tool_call(tools: &ToolRegistry, call: brain_types::ToolCall) -> String {
    let args: serde_json::Value = match serde_json::from_str(&call.arguments) {
        Ok(v) => v,
        Err(e) => return format!("Error: invalid JSON arguments: {e}"),
    };
    match tools.call(&call.name, args).await {
        Ok(result) => result,
        Err(e) => format!("Error: {e}"),
    }
}
