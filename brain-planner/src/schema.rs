use brain_types::ToolSchema;

/// The fixed tool-set offered to the Planner's model (§4.4 "Planner tools").
pub fn planner_tool_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "locate".to_string(),
            description: "Fast file-finding; routed to a quick-thoroughness Explorer.".to_string(),
            parameters_schema: serde_json::json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
            strict: None,
        },
        ToolSchema {
            name: "analyze".to_string(),
            description: "Deep tracing; routed to a medium/thorough Explorer.".to_string(),
            parameters_schema: serde_json::json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
            strict: None,
        },
        ToolSchema {
            name: "submit_actions".to_string(),
            description: "Terminal call: submits the structured action batch for this turn."
                .to_string(),
            parameters_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "actions": {"type": "array"},
                    "reasoning": {"type": "string"}
                },
                "required": ["actions", "reasoning"]
            }),
            strict: None,
        },
    ]
}
