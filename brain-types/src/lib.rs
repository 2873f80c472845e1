//! Data model and external-interface traits shared by the `brain` agent core.
//!
//! This crate is deliberately inert: no I/O, no model invocation, no filesystem access.
//! It exists so `brain-dispatch`, `brain-tool`, `brain-toolbelt`, `brain-explorer`,
//! `brain-planner`, and `brain-executor` can share one vocabulary without depending
//! on each other.

mod action;
mod error;
mod interfaces;
mod message;
mod metrics;
mod thoroughness;

pub use action::{
    Action, FindingAdd, FindingSource, GapAdd, GapClose, GapCloseReason, GapRespondent,
    GapSeverity, LearningKind, LearningProposal, PostCommentData, ReadyForSpecGenerationData,
    SetSpecStatusData, SpecStatus, UpdateFindingsData, UpdateGapsData, UpdateLearningsData,
    UpdateSpecData,
};
pub use error::{GraphError, ModelError, StoreError};
pub use interfaces::{
    CodeGraphClient, Finding, FindingStore, Gap, GapStatus, GapStore, GraphNode, IssueStore,
    IssueTracker, Learning, LearningStore, Spec, SpecStore, SymbolSearchOptions, ToolSchema,
};
pub use message::{AgentResponse, Message, Role, ToolCall};
pub use metrics::{
    normalize_tool_args, ActionCounts, Confidence, ExploreMetrics, PlannerMetrics, PlannerOutput,
    TerminationReason, ToolCallRecord,
};
pub use thoroughness::{BudgetPolicy, Thoroughness};

pub use interfaces::LlmClient;
