use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCommentData {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingSource {
    pub location: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingAdd {
    pub synthesis: String,
    pub sources: Vec<FindingSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFindingsData {
    #[serde(default)]
    pub add: Vec<FindingAdd>,
    #[serde(default)]
    pub remove: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapSeverity {
    Blocking,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapRespondent {
    Reporter,
    Assignee,
    Thread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapCloseReason {
    Answered,
    Inferred,
    NotRelevant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapAdd {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    pub severity: GapSeverity,
    pub respondent: GapRespondent,
    #[serde(default)]
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapClose {
    pub gap_id: String,
    pub reason: GapCloseReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGapsData {
    #[serde(default)]
    pub add: Vec<GapAdd>,
    #[serde(default)]
    pub close: Vec<GapClose>,
    #[serde(default)]
    pub ask: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningKind {
    Domain,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningProposal {
    #[serde(rename = "type")]
    pub kind: LearningKind,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLearningsData {
    #[serde(default)]
    pub propose: Vec<LearningProposal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyForSpecGenerationData {
    pub context_summary: String,
    pub relevant_finding_ids: Vec<String>,
    pub closed_gap_ids: Vec<String>,
    pub proceed_signal: bool,
    pub learnings_applied: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSpecData {
    pub content_markdown: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecStatus {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSpecStatusData {
    pub status: SpecStatus,
}

/// A Planner action: a tagged union over the closed set of action kinds (§3, §4.4).
///
/// The executor (`brain-executor`) performs a total match over this enum; adding a
/// variant here without a matching arm there is a compile error, not a silent skip
/// (§9 "Tagged action variants").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Action {
    PostComment(PostCommentData),
    UpdateFindings(UpdateFindingsData),
    UpdateGaps(UpdateGapsData),
    UpdateLearnings(UpdateLearningsData),
    ReadyForSpecGeneration(ReadyForSpecGenerationData),
    UpdateSpec(UpdateSpecData),
    SetSpecStatus(SetSpecStatusData),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_round_trip_in_order() {
        let actions = vec![
            Action::PostComment(PostCommentData {
                content: "hi".into(),
                reply_to_id: None,
            }),
            Action::SetSpecStatus(SetSpecStatusData {
                status: SpecStatus::Approved,
            }),
        ];
        let json = serde_json::to_string(&actions).unwrap();
        let back: Vec<Action> = serde_json::from_str(&json).unwrap();
        assert_eq!(actions, back);
    }

    #[test]
    fn action_tag_matches_payload() {
        let json = serde_json::json!({
            "type": "update_gaps",
            "data": {
                "add": [],
                "close": [{"gap_id": "g1", "reason": "not_relevant"}],
                "ask": []
            }
        });
        let action: Action = serde_json::from_value(json).unwrap();
        match action {
            Action::UpdateGaps(data) => {
                assert_eq!(data.close[0].reason, GapCloseReason::NotRelevant);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
