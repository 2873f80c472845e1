use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, ModelError, StoreError};
use crate::message::{AgentResponse, Message};

/// Schema for one tool exposed to the model on a `ChatWithTools` call (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// The sole capability the core requires of an LLM client (§6).
///
/// Modeled with return-position `impl Trait` rather than `#[async_trait]`, matching
/// the object-safety boundary the rest of this workspace observes: callers that need
/// dynamic dispatch over an `LlmClient` erase it behind a concrete adapter rather than
/// making this trait itself `dyn`-compatible.
pub trait LlmClient: Send + Sync {
    fn chat_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> impl std::future::Future<Output = Result<AgentResponse, ModelError>> + Send;
}

/// Issue-tracker integration (§6).
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_discussion(&self, issue_id: &str, content: &str) -> Result<String, StoreError>;
    async fn reply_to_thread(
        &self,
        issue_id: &str,
        discussion_id: &str,
        content: &str,
    ) -> Result<(), StoreError>;
}

/// Open question status for a tracked gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapStatus {
    Open,
    Pending,
    Resolved,
    Skipped,
}

/// A tracked open question (see GLOSSARY "Gap").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    pub id: String,
    pub issue_id: String,
    pub question: String,
    pub evidence: Option<String>,
    pub status: GapStatus,
    pub close_note: Option<String>,
}

/// Gap store (§6).
#[async_trait]
pub trait GapStore: Send + Sync {
    async fn create(&self, gap: Gap) -> Result<String, StoreError>;
    async fn close(
        &self,
        id: &str,
        status: GapStatus,
        reason: &str,
        note: Option<&str>,
    ) -> Result<(), StoreError>;
    async fn get_by_short_id(&self, short_id: &str) -> Result<Gap, StoreError>;
    async fn list_closed_by_issue(&self, issue_id: &str, limit: usize) -> Result<Vec<Gap>, StoreError>;
}

/// A durable, evidence-bearing note about the codebase (GLOSSARY "Finding").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub issue_id: String,
    pub synthesis: String,
    pub sources: Value,
}

/// Findings store (§6, §4.5 `update_findings`).
#[async_trait]
pub trait FindingStore: Send + Sync {
    async fn remove(&self, issue_id: &str, ids: &[String]) -> Result<(), StoreError>;
    async fn append(&self, finding: Finding) -> Result<String, StoreError>;
    async fn list_by_issue(&self, issue_id: &str) -> Result<Vec<Finding>, StoreError>;
    /// Retains only the most recent `max` findings for the issue (tail-capped, §4.5).
    async fn retain_most_recent(&self, issue_id: &str, max: usize) -> Result<(), StoreError>;
}

/// A durable fact about the domain or codebase conventions (GLOSSARY "Learning").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learning {
    pub workspace_id: String,
    pub kind: String,
    pub content: String,
}

/// Learning store (§6, §4.5 `update_learnings`).
///
/// A duplicate-key violation on `insert` is the executor's concern to swallow
/// (§7 `DuplicateLearning`); this trait surfaces it as an ordinary `StoreError::DuplicateKey`.
#[async_trait]
pub trait LearningStore: Send + Sync {
    async fn insert(&self, learning: Learning) -> Result<(), StoreError>;
    async fn list_by_workspace(&self, workspace_id: &str) -> Result<Vec<Learning>, StoreError>;
}

/// Minimal issue metadata the executor needs (workspace resolution, bot identity, §4.5).
#[async_trait]
pub trait IssueStore: Send + Sync {
    async fn workspace_id_for_issue(&self, issue_id: &str) -> Result<String, StoreError>;
    async fn bot_username(&self, issue_id: &str) -> Result<String, StoreError>;
    async fn set_spec_reference(&self, issue_id: &str, spec_id: &str) -> Result<(), StoreError>;
}

/// A structured handoff document (GLOSSARY "Spec").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spec {
    pub id: String,
    pub issue_id: String,
    pub content_markdown: String,
    pub status: Option<String>,
}

/// Spec store and external spec generator (§6, §4.5 `ready_for_spec_generation`,
/// `update_spec`, `set_spec_status`).
#[async_trait]
pub trait SpecStore: Send + Sync {
    async fn get_for_issue(&self, issue_id: &str) -> Result<Option<Spec>, StoreError>;
    async fn persist(&self, spec: Spec) -> Result<String, StoreError>;
    async fn update_content(&self, spec_id: &str, content_markdown: &str) -> Result<(), StoreError>;
    async fn set_status(&self, spec_id: &str, status: &str) -> Result<(), StoreError>;
    async fn generate(
        &self,
        context_summary: &str,
        findings: &[Finding],
        learnings: &[Learning],
        existing: Option<&Spec>,
    ) -> Result<String, StoreError>;
}

/// One node returned by the code-graph backend (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub kind: String,
    pub qname: String,
    pub filepath: String,
    pub pos: (u32, u32),
    pub signature: Option<String>,
}

/// Options for `graph.search` discovery queries.
#[derive(Debug, Clone, Default)]
pub struct SymbolSearchOptions {
    pub name: String,
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub file: Option<String>,
}

/// Semantic code-graph backend (§6, §4.1 `graph`).
#[async_trait]
pub trait CodeGraphClient: Send + Sync {
    async fn get_file_symbols(&self, file: &str) -> Result<Vec<GraphNode>, GraphError>;
    async fn search_symbols(
        &self,
        opts: SymbolSearchOptions,
    ) -> Result<(Vec<GraphNode>, usize), GraphError>;
    async fn get_callers(&self, qname: &str, depth: u32) -> Result<Vec<GraphNode>, GraphError>;
    async fn get_callees(&self, qname: &str, depth: u32) -> Result<Vec<GraphNode>, GraphError>;
    async fn get_methods(&self, qname: &str) -> Result<Vec<GraphNode>, GraphError>;
    async fn get_implementations(&self, qname: &str) -> Result<Vec<GraphNode>, GraphError>;
    async fn get_usages(&self, qname: &str) -> Result<Vec<GraphNode>, GraphError>;
    async fn get_inheritors(&self, qname: &str) -> Result<Vec<GraphNode>, GraphError>;
}
