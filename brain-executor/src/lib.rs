//! The Action Executor (§4.5): applies one Planner action batch to the external
//! stores and issue tracker, never short-circuiting on a single action's failure.

mod error;

pub use error::ActionError;

use std::sync::Arc;
use std::sync::LazyLock;

use brain_types::{
    Action, GapCloseReason, GapStatus, GapStore, IssueStore, IssueTracker, Finding, FindingStore,
    GapAdd, GapClose, Gap, Learning, LearningStore, PostCommentData, ReadyForSpecGenerationData,
    SetSpecStatusData, Spec, SpecStatus, SpecStore, StoreError, UpdateFindingsData, UpdateGapsData,
    UpdateLearningsData, UpdateSpecData,
};
use regex::Regex;

static GAP_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[gap\s+\d+\]\s*").unwrap());

/// Most recent findings kept per issue after an `update_findings` action (§5 `maxCodeFindings`).
pub const MAX_CODE_FINDINGS: usize = 20;

/// Closed gaps loaded as context for spec generation (§4.5 `ready_for_spec_generation`).
pub const MAX_CLOSED_GAPS_FOR_SPEC: usize = 50;

/// Applies [`Action`]s against a fixed set of collaborators.
///
/// Each collaborator is held as a trait object since, unlike [`brain_types::LlmClient`],
/// these interfaces are used polymorphically across backends and are not on the model's
/// hot path (§9 "Cyclic agent/tool references" doesn't apply here — there is no cycle).
pub struct Executor {
    pub issue_tracker: Arc<dyn IssueTracker>,
    pub gap_store: Arc<dyn GapStore>,
    pub finding_store: Arc<dyn FindingStore>,
    pub learning_store: Arc<dyn LearningStore>,
    pub issue_store: Arc<dyn IssueStore>,
    pub spec_store: Arc<dyn SpecStore>,
}

impl Executor {
    pub fn new(
        issue_tracker: Arc<dyn IssueTracker>,
        gap_store: Arc<dyn GapStore>,
        finding_store: Arc<dyn FindingStore>,
        learning_store: Arc<dyn LearningStore>,
        issue_store: Arc<dyn IssueStore>,
        spec_store: Arc<dyn SpecStore>,
    ) -> Self {
        Self {
            issue_tracker,
            gap_store,
            finding_store,
            learning_store,
            issue_store,
            spec_store,
        }
    }

    /// Applies every action in order, collecting one `Result` per action. A failed
    /// action never prevents the rest of the batch from running (§4.5, §7).
    pub async fn execute_batch(
        &self,
        issue_id: &str,
        actions: Vec<Action>,
    ) -> Vec<Result<(), ActionError>> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            let result = self.execute_one(issue_id, action).await;
            if let Err(ref e) = result {
                tracing::warn!(issue_id, error = %e, "action_executor.action_failed");
            }
            results.push(result);
        }
        results
    }

    async fn execute_one(&self, issue_id: &str, action: Action) -> Result<(), ActionError> {
        match action {
            Action::PostComment(data) => self.post_comment(issue_id, data).await,
            Action::UpdateFindings(data) => self.update_findings(issue_id, data).await,
            Action::UpdateGaps(data) => self.update_gaps(issue_id, data).await,
            Action::UpdateLearnings(data) => self.update_learnings(issue_id, data).await,
            Action::ReadyForSpecGeneration(data) => {
                self.ready_for_spec_generation(issue_id, data).await
            }
            Action::UpdateSpec(data) => self.update_spec(issue_id, data).await,
            Action::SetSpecStatus(data) => self.set_spec_status(issue_id, data).await,
        }
    }

    async fn post_comment(&self, issue_id: &str, data: PostCommentData) -> Result<(), ActionError> {
        let stripped = GAP_MARKER.replace_all(&data.content, "");
        let marker_count = GAP_MARKER.find_iter(&data.content).count();
        tracing::info!(issue_id, stripped = marker_count, "action_executor.post_comment");

        match data.reply_to_id.filter(|id| !id.is_empty()) {
            Some(thread_id) => {
                self.issue_tracker
                    .reply_to_thread(issue_id, &thread_id, &stripped)
                    .await?;
            }
            None => {
                self.issue_tracker.create_discussion(issue_id, &stripped).await?;
            }
        }
        Ok(())
    }

    async fn update_findings(
        &self,
        issue_id: &str,
        data: UpdateFindingsData,
    ) -> Result<(), ActionError> {
        if !data.remove.is_empty() {
            self.finding_store.remove(issue_id, &data.remove).await?;
        }
        for add in data.add {
            let sources = serde_json::to_value(&add.sources)
                .map_err(|e| ActionError::InvalidData(e.to_string()))?;
            let finding = Finding {
                id: uuid::Uuid::new_v4().to_string(),
                issue_id: issue_id.to_string(),
                synthesis: add.synthesis,
                sources,
            };
            self.finding_store.append(finding).await?;
        }
        self.finding_store
            .retain_most_recent(issue_id, MAX_CODE_FINDINGS)
            .await?;
        Ok(())
    }

    async fn update_gaps(&self, issue_id: &str, data: UpdateGapsData) -> Result<(), ActionError> {
        for GapAdd {
            question,
            evidence,
            severity: _severity,
            respondent: _respondent,
            pending,
        } in data.add
        {
            let gap = Gap {
                id: uuid::Uuid::new_v4().to_string(),
                issue_id: issue_id.to_string(),
                question,
                evidence,
                status: if pending { GapStatus::Pending } else { GapStatus::Open },
                close_note: None,
            };
            self.gap_store.create(gap).await?;
        }

        for GapClose { gap_id, reason, note } in data.close {
            let status = match reason {
                GapCloseReason::Answered | GapCloseReason::Inferred => GapStatus::Resolved,
                GapCloseReason::NotRelevant => GapStatus::Skipped,
            };
            let reason_label = match reason {
                GapCloseReason::Answered => "answered",
                GapCloseReason::Inferred => "inferred",
                GapCloseReason::NotRelevant => "not_relevant",
            };
            let resolved_id = match self
                .gap_store
                .close(&gap_id, status, reason_label, note.as_deref())
                .await
            {
                Err(StoreError::NotFound) => {
                    let gap = self.gap_store.get_by_short_id(&gap_id).await?;
                    self.gap_store
                        .close(&gap.id, status, reason_label, note.as_deref())
                        .await?;
                    gap.id
                }
                Err(e) => return Err(e.into()),
                Ok(()) => gap_id,
            };
            tracing::debug!(issue_id, gap_id = %resolved_id, "action_executor.gap_closed");
        }

        // `ask` is handled by the caller surfacing the question, not by this store —
        // nothing to persist here (§4.5 lists no storage effect for it).
        Ok(())
    }

    async fn update_learnings(
        &self,
        issue_id: &str,
        data: UpdateLearningsData,
    ) -> Result<(), ActionError> {
        let workspace_id = self.issue_store.workspace_id_for_issue(issue_id).await?;
        for proposal in data.propose {
            let learning = Learning {
                workspace_id: workspace_id.clone(),
                kind: match proposal.kind {
                    brain_types::LearningKind::Domain => "domain".to_string(),
                    brain_types::LearningKind::Code => "code".to_string(),
                },
                content: proposal.content,
            };
            match self.learning_store.insert(learning).await {
                Ok(()) | Err(StoreError::DuplicateKey) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn ready_for_spec_generation(
        &self,
        issue_id: &str,
        data: ReadyForSpecGenerationData,
    ) -> Result<(), ActionError> {
        let closed_gaps = self
            .gap_store
            .list_closed_by_issue(issue_id, MAX_CLOSED_GAPS_FOR_SPEC)
            .await?;
        let workspace_id = self.issue_store.workspace_id_for_issue(issue_id).await?;
        let learnings = self.learning_store.list_by_workspace(&workspace_id).await?;
        let _bot_username = self.issue_store.bot_username(issue_id).await?;
        let existing = self.spec_store.get_for_issue(issue_id).await?;

        let findings: Vec<Finding> = closed_gaps
            .iter()
            .map(|g| Finding {
                id: g.id.clone(),
                issue_id: issue_id.to_string(),
                synthesis: g.question.clone(),
                sources: serde_json::Value::Null,
            })
            .collect();

        let content = self
            .spec_store
            .generate(&data.context_summary, &findings, &learnings, existing.as_ref())
            .await?;

        let spec = Spec {
            id: existing.map(|s| s.id).unwrap_or_default(),
            issue_id: issue_id.to_string(),
            content_markdown: content,
            status: None,
        };
        let spec_id = self.spec_store.persist(spec).await?;
        self.issue_store.set_spec_reference(issue_id, &spec_id).await?;
        Ok(())
    }

    async fn update_spec(&self, issue_id: &str, data: UpdateSpecData) -> Result<(), ActionError> {
        let spec = self
            .spec_store
            .get_for_issue(issue_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        self.spec_store
            .update_content(&spec.id, &data.content_markdown)
            .await?;
        Ok(())
    }

    async fn set_spec_status(
        &self,
        issue_id: &str,
        data: SetSpecStatusData,
    ) -> Result<(), ActionError> {
        let spec = self
            .spec_store
            .get_for_issue(issue_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        let status = match data.status {
            SpecStatus::Approved => "approved",
            SpecStatus::Rejected => "rejected",
        };
        self.spec_store.set_status(&spec.id, status).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubTracker {
        posted: Mutex<Vec<(String, Option<String>, String)>>,
    }

    #[async_trait]
    impl IssueTracker for StubTracker {
        async fn create_discussion(&self, issue_id: &str, content: &str) -> Result<String, StoreError> {
            self.posted
                .lock()
                .unwrap()
                .push((issue_id.to_string(), None, content.to_string()));
            Ok("discussion-1".to_string())
        }
        async fn reply_to_thread(
            &self,
            issue_id: &str,
            discussion_id: &str,
            content: &str,
        ) -> Result<(), StoreError> {
            self.posted.lock().unwrap().push((
                issue_id.to_string(),
                Some(discussion_id.to_string()),
                content.to_string(),
            ));
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubGapStore {
        gaps: Mutex<Vec<Gap>>,
    }

    #[async_trait]
    impl GapStore for StubGapStore {
        async fn create(&self, gap: Gap) -> Result<String, StoreError> {
            let id = gap.id.clone();
            self.gaps.lock().unwrap().push(gap);
            Ok(id)
        }
        async fn close(
            &self,
            id: &str,
            status: GapStatus,
            _reason: &str,
            note: Option<&str>,
        ) -> Result<(), StoreError> {
            let mut gaps = self.gaps.lock().unwrap();
            let gap = gaps.iter_mut().find(|g| g.id == id).ok_or(StoreError::NotFound)?;
            gap.status = status;
            gap.close_note = note.map(str::to_string);
            Ok(())
        }
        async fn get_by_short_id(&self, short_id: &str) -> Result<Gap, StoreError> {
            self.gaps
                .lock()
                .unwrap()
                .iter()
                .find(|g| g.id.starts_with(short_id))
                .cloned()
                .ok_or(StoreError::NotFound)
        }
        async fn list_closed_by_issue(&self, issue_id: &str, limit: usize) -> Result<Vec<Gap>, StoreError> {
            Ok(self
                .gaps
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.issue_id == issue_id && g.status != GapStatus::Open)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct StubFindingStore {
        findings: Mutex<Vec<Finding>>,
    }

    #[async_trait]
    impl FindingStore for StubFindingStore {
        async fn remove(&self, issue_id: &str, ids: &[String]) -> Result<(), StoreError> {
            self.findings
                .lock()
                .unwrap()
                .retain(|f| !(f.issue_id == issue_id && ids.contains(&f.id)));
            Ok(())
        }
        async fn append(&self, finding: Finding) -> Result<String, StoreError> {
            let id = finding.id.clone();
            self.findings.lock().unwrap().push(finding);
            Ok(id)
        }
        async fn list_by_issue(&self, issue_id: &str) -> Result<Vec<Finding>, StoreError> {
            Ok(self
                .findings
                .lock()
                .unwrap()
                .iter()
                .filter(|f| f.issue_id == issue_id)
                .cloned()
                .collect())
        }
        async fn retain_most_recent(&self, issue_id: &str, max: usize) -> Result<(), StoreError> {
            let mut findings = self.findings.lock().unwrap();
            let count = findings.iter().filter(|f| f.issue_id == issue_id).count();
            if count > max {
                let mut dropped = count - max;
                findings.retain(|f| {
                    if f.issue_id == issue_id && dropped > 0 {
                        dropped -= 1;
                        false
                    } else {
                        true
                    }
                });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubLearningStore {
        learnings: Mutex<Vec<Learning>>,
        fail_on_content: Option<&'static str>,
    }

    #[async_trait]
    impl LearningStore for StubLearningStore {
        async fn insert(&self, learning: Learning) -> Result<(), StoreError> {
            if self.fail_on_content.as_deref() == Some(learning.content.as_str()) {
                return Err(StoreError::DuplicateKey);
            }
            self.learnings.lock().unwrap().push(learning);
            Ok(())
        }
        async fn list_by_workspace(&self, workspace_id: &str) -> Result<Vec<Learning>, StoreError> {
            Ok(self
                .learnings
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.workspace_id == workspace_id)
                .cloned()
                .collect())
        }
    }

    struct StubIssueStore;

    #[async_trait]
    impl IssueStore for StubIssueStore {
        async fn workspace_id_for_issue(&self, _issue_id: &str) -> Result<String, StoreError> {
            Ok("ws-1".to_string())
        }
        async fn bot_username(&self, _issue_id: &str) -> Result<String, StoreError> {
            Ok("brain-bot".to_string())
        }
        async fn set_spec_reference(&self, _issue_id: &str, _spec_id: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubSpecStore {
        specs: Mutex<Vec<Spec>>,
    }

    #[async_trait]
    impl SpecStore for StubSpecStore {
        async fn get_for_issue(&self, issue_id: &str) -> Result<Option<Spec>, StoreError> {
            Ok(self
                .specs
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.issue_id == issue_id)
                .cloned())
        }
        async fn persist(&self, spec: Spec) -> Result<String, StoreError> {
            let mut specs = self.specs.lock().unwrap();
            let id = if spec.id.is_empty() {
                uuid::Uuid::new_v4().to_string()
            } else {
                spec.id.clone()
            };
            specs.retain(|s| s.id != id);
            specs.push(Spec { id: id.clone(), ..spec });
            Ok(id)
        }
        async fn update_content(&self, spec_id: &str, content_markdown: &str) -> Result<(), StoreError> {
            let mut specs = self.specs.lock().unwrap();
            let spec = specs.iter_mut().find(|s| s.id == spec_id).ok_or(StoreError::NotFound)?;
            spec.content_markdown = content_markdown.to_string();
            Ok(())
        }
        async fn set_status(&self, spec_id: &str, status: &str) -> Result<(), StoreError> {
            let mut specs = self.specs.lock().unwrap();
            let spec = specs.iter_mut().find(|s| s.id == spec_id).ok_or(StoreError::NotFound)?;
            spec.status = Some(status.to_string());
            Ok(())
        }
        async fn generate(
            &self,
            context_summary: &str,
            _findings: &[Finding],
            _learnings: &[Learning],
            _existing: Option<&Spec>,
        ) -> Result<String, StoreError> {
            Ok(format!("# Spec\n\n{context_summary}"))
        }
    }

    fn make_executor() -> (
        Executor,
        Arc<StubTracker>,
        Arc<StubGapStore>,
        Arc<StubFindingStore>,
        Arc<StubSpecStore>,
    ) {
        let tracker = Arc::new(StubTracker::default());
        let gaps = Arc::new(StubGapStore::default());
        let findings = Arc::new(StubFindingStore::default());
        let learnings = Arc::new(StubLearningStore::default());
        let specs = Arc::new(StubSpecStore::default());
        let executor = Executor::new(
            tracker.clone(),
            gaps.clone(),
            findings.clone(),
            learnings.clone(),
            Arc::new(StubIssueStore),
            specs.clone(),
        );
        (executor, tracker, gaps, findings, specs)
    }

    #[tokio::test]
    async fn sanitizes_gap_markers_in_post_comment() {
        let (executor, tracker, ..) = make_executor();
        let results = executor
            .execute_batch(
                "issue-1",
                vec![Action::PostComment(PostCommentData {
                    content: "[gap 17] Q?\n[gap  42] Q2?".to_string(),
                    reply_to_id: None,
                })],
            )
            .await;
        assert!(results[0].is_ok());
        let posted = tracker.posted.lock().unwrap();
        assert_eq!(posted[0].2, "Q?\nQ2?");
    }

    #[tokio::test]
    async fn reply_to_thread_when_reply_to_id_present() {
        let (executor, tracker, ..) = make_executor();
        executor
            .execute_batch(
                "issue-1",
                vec![Action::PostComment(PostCommentData {
                    content: "hello".to_string(),
                    reply_to_id: Some("thread-9".to_string()),
                })],
            )
            .await;
        let posted = tracker.posted.lock().unwrap();
        assert_eq!(posted[0].1.as_deref(), Some("thread-9"));
    }

    #[tokio::test]
    async fn update_findings_caps_at_twenty() {
        let (executor, _tracker, _gaps, findings, _specs) = make_executor();
        let adds = (0..25)
            .map(|i| brain_types::FindingAdd {
                synthesis: format!("finding {i}"),
                sources: vec![],
            })
            .collect();
        executor
            .execute_batch(
                "issue-1",
                vec![Action::UpdateFindings(UpdateFindingsData {
                    add: adds,
                    remove: vec![],
                })],
            )
            .await;
        assert_eq!(findings.list_by_issue("issue-1").await.unwrap().len(), MAX_CODE_FINDINGS);
    }

    #[tokio::test]
    async fn update_gaps_maps_close_reasons() {
        let (executor, _tracker, gaps, ..) = make_executor();
        executor
            .execute_batch(
                "issue-1",
                vec![Action::UpdateGaps(UpdateGapsData {
                    add: vec![GapAdd {
                        question: "why?".to_string(),
                        evidence: None,
                        severity: brain_types::GapSeverity::Medium,
                        respondent: brain_types::GapRespondent::Reporter,
                        pending: false,
                    }],
                    close: vec![],
                    ask: vec![],
                })],
            )
            .await;
        let gap_id = gaps.gaps.lock().unwrap()[0].id.clone();

        executor
            .execute_batch(
                "issue-1",
                vec![Action::UpdateGaps(UpdateGapsData {
                    add: vec![],
                    close: vec![GapClose {
                        gap_id,
                        reason: brain_types::GapCloseReason::NotRelevant,
                        note: None,
                    }],
                    ask: vec![],
                })],
            )
            .await;

        assert_eq!(gaps.gaps.lock().unwrap()[0].status, GapStatus::Skipped);
    }

    #[tokio::test]
    async fn update_learnings_swallows_duplicate_key() {
        let tracker = Arc::new(StubTracker::default());
        let gaps = Arc::new(StubGapStore::default());
        let findings = Arc::new(StubFindingStore::default());
        let learnings = Arc::new(StubLearningStore {
            learnings: Mutex::new(vec![]),
            fail_on_content: Some("dup"),
        });
        let specs = Arc::new(StubSpecStore::default());
        let executor = Executor::new(
            tracker,
            gaps,
            findings,
            learnings.clone(),
            Arc::new(StubIssueStore),
            specs,
        );

        let results = executor
            .execute_batch(
                "issue-1",
                vec![Action::UpdateLearnings(UpdateLearningsData {
                    propose: vec![
                        brain_types::LearningProposal {
                            kind: brain_types::LearningKind::Domain,
                            content: "dup".to_string(),
                        },
                        brain_types::LearningProposal {
                            kind: brain_types::LearningKind::Code,
                            content: "fresh".to_string(),
                        },
                    ],
                })],
            )
            .await;

        assert!(results[0].is_ok());
        assert_eq!(learnings.list_by_workspace("ws-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn batch_keeps_applying_after_one_action_fails() {
        let (executor, _tracker, _gaps, _findings, specs) = make_executor();
        let results = executor
            .execute_batch(
                "issue-1",
                vec![
                    Action::UpdateSpec(UpdateSpecData {
                        content_markdown: "x".to_string(),
                        reason: "no existing spec".to_string(),
                    }),
                    Action::PostComment(PostCommentData {
                        content: "still runs".to_string(),
                        reply_to_id: None,
                    }),
                ],
            )
            .await;
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
        assert!(specs.specs.lock().unwrap().is_empty());
    }
}
