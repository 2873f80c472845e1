//! CLI driver wiring the Planner, Explorer, Toolbelt, and Action Executor into one
//! runnable process (§10.5).

mod config;
mod debug;
mod error;
mod graph;
pub mod offline;

pub use config::{BrainConfig, BudgetOverride, ThoroughnessOverrides};
pub use debug::{session_id_now, DebugWriter};
pub use error::BrainError;
pub use graph::NullGraphClient;

use std::sync::Arc;

use brain_explorer::ExplorerConfig;
use brain_planner::{Planner, PlannerConfig};
use brain_types::{Action, LlmClient, Message};
use tokio_util::sync::CancellationToken;

/// One invocation of the `run` subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub prompt: String,
}

/// The Planner's terminal answer, formatted for CLI display. This driver does not
/// invoke the Action Executor — it has no real issue tracker or stores to apply
/// actions against (§10.5: a thin driver for local exercising, not the production
/// entry point) — so it prints the actions it would have submitted instead.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reasoning: String,
    pub actions: Vec<Action>,
}

/// Runs one Planner session to completion against `llm` and the repo at
/// `config.repo_root`, using an unbacked code-graph client (§10.5).
pub async fn run(
    config: BrainConfig,
    llm: impl LlmClient + Clone + 'static,
    request: RunRequest,
) -> Result<RunOutcome, BrainError> {
    let toolbelt = brain_toolbelt::Toolbelt::new(&config.repo_root, Arc::new(NullGraphClient))?;
    let registry = toolbelt.registry();

    let explorer_config = ExplorerConfig {
        max_parallel_tools: config.max_parallel_tools,
        doom_loop_threshold: config.doom_loop_threshold,
        ..ExplorerConfig::default()
    };
    let planner_config = PlannerConfig {
        max_parallel_explorers: config.max_parallel_explorers,
        ..PlannerConfig::default()
    };

    let planner = Planner::new(llm, registry, explorer_config, planner_config);
    let session_id = session_id_now();
    let messages = vec![Message::user(request.prompt)];

    let (output, metrics) = planner
        .plan(session_id.clone(), messages, CancellationToken::new())
        .await;

    let debug_writer = DebugWriter::from_env();
    debug_writer.write_planner_transcript(&session_id, &output.reasoning)?;
    debug_writer.write_planner_metrics(&session_id, &metrics)?;

    Ok(RunOutcome {
        reasoning: output.reasoning,
        actions: output.actions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use offline::OfflineLlmClient;

    #[tokio::test]
    async fn run_completes_against_offline_client() {
        let repo = tempfile::tempdir().unwrap();
        let config = BrainConfig {
            repo_root: repo.path().to_path_buf(),
            ..BrainConfig::default()
        };
        let outcome = run(
            config,
            OfflineLlmClient,
            RunRequest {
                prompt: "what does this repo do?".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(outcome.actions.is_empty());
        assert!(!outcome.reasoning.is_empty());
    }
}
