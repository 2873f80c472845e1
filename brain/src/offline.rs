use brain_types::{AgentResponse, LlmClient, Message, ModelError, ToolSchema};

/// A deterministic, network-free [`LlmClient`] for locally exercising the CLI driver
/// (§10.5: "a thin driver for local exercising of the core, not the production entry
/// point"). Real deployments inject their own client at the integration layer; this one
/// always concludes immediately with no tool calls, mirroring the teacher's own offline
/// test-harness idiom rather than talking to any model provider.
#[derive(Debug, Clone, Default)]
pub struct OfflineLlmClient;

impl LlmClient for OfflineLlmClient {
    fn chat_with_tools(
        &self,
        _messages: &[Message],
        _tools: &[ToolSchema],
    ) -> impl std::future::Future<Output = Result<AgentResponse, ModelError>> + Send {
        async move {
            Ok(AgentResponse {
                content: "offline driver: no model backend configured; nothing to report."
                    .to_string(),
                tool_calls: vec![],
                prompt_tokens: 0,
                completion_tokens: 0,
            })
        }
    }
}
