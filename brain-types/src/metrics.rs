use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::message::Message;

/// Explorer self-assessed confidence in its own report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Unknown,
}

/// Why an Explorer or Planner session stopped looping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Natural,
    IterationLimit,
    HardLimit,
    DoomLoop,
    Error,
}

/// `{name, normalized-args}` — one entry in the doom-loop sliding window (§3, §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRecord {
    pub name: String,
    pub normalized_args: String,
}

/// Metrics recorded for one Explorer.Explore invocation (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreMetrics {
    pub session_id: String,
    pub query: String,
    pub thoroughness: crate::thoroughness::Thoroughness,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub iterations: u32,
    pub final_context_tokens: u64,
    pub cumulative_completion_tokens: u64,
    pub tool_call_counts: HashMap<String, u32>,
    pub confidence: Confidence,
    pub hit_soft_limit: bool,
    pub hit_hard_limit: bool,
    pub doom_loop_detected: bool,
    pub final_report_length: usize,
    pub termination_reason: TerminationReason,
}

/// The Planner's terminal output for one Planner.Plan invocation (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerOutput {
    pub actions: Vec<Action>,
    pub reasoning: String,
    pub messages: Vec<Message>,
    pub submit_actions_call_id: Option<String>,
}

/// Per-action-type tally, used in [`PlannerMetrics::action_counts`].
pub type ActionCounts = HashMap<&'static str, u32>;

/// Metrics recorded for one Planner.Plan invocation (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerMetrics {
    pub session_id: String,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub iterations: u32,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub action_counts: HashMap<String, u32>,
    pub gaps_opened: u32,
    pub gaps_closed: u32,
    pub gaps_closed_by_reason: HashMap<String, u32>,
    pub learnings_added: u32,
    pub findings_added: u32,
    pub reached_spec_generation: bool,
    pub locate_calls: u32,
    pub analyze_calls: u32,
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Parses the argument string as JSON and re-serializes it for byte-exact comparison
/// in the doom-loop sliding window (§4.2 "Argument normalization"). Falls back to the
/// raw string when either step fails.
pub fn normalize_tool_args(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|v| serde_json::to_string(&v))
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_order_insensitive() {
        let a = normalize_tool_args(r#"{"a":1,"b":2}"#);
        let b = normalize_tool_args(r#"{"b":2,"a":1}"#);
        assert_eq!(a, b);
    }

    #[test]
    fn normalization_falls_back_on_invalid_json() {
        let raw = "not json {{{";
        assert_eq!(normalize_tool_args(raw), raw);
    }
}
