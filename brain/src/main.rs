use brain::offline::OfflineLlmClient;
use brain::{run, BrainConfig, BrainError, RunRequest};
use std::io::Read;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run_cli().await {
        eprintln!("brain error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), BrainError> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut command = "run".to_string();
    if let Some(first) = args.first().cloned() {
        if first == "run" || first == "--help" || first == "-h" {
            args.remove(0);
            command = first;
        } else if first.starts_with('-') {
            command = "run".to_string();
        } else {
            return Err(BrainError::Config(format!("unknown subcommand: {first}")));
        }
    }

    if command == "--help" || command == "-h" {
        print_usage();
        return Ok(());
    }

    let mut config_path: Option<PathBuf> = None;
    let mut prompt: Option<String> = None;
    let mut repo_root: Option<PathBuf> = None;

    let mut remaining = args;
    while let Some(flag) = remaining.first().cloned() {
        remaining.remove(0);
        match flag.as_str() {
            "--config" => config_path = Some(PathBuf::from(take_arg("--config", &mut remaining)?)),
            "--prompt" => prompt = Some(take_arg("--prompt", &mut remaining)?),
            "--repo-root" => repo_root = Some(PathBuf::from(take_arg("--repo-root", &mut remaining)?)),
            other => return Err(BrainError::Config(format!("unknown flag: {other}"))),
        }
    }

    let mut config = if let Some(path) = config_path {
        BrainConfig::from_path(&path)?
    } else {
        let default_path = PathBuf::from("brain.json");
        if default_path.exists() {
            BrainConfig::from_path(&default_path)?
        } else {
            BrainConfig::default()
        }
    };

    if let Some(path) = repo_root {
        config.repo_root = path;
    }

    let prompt = match prompt {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            let trimmed = buffer.trim().to_string();
            if trimmed.is_empty() {
                return Err(BrainError::Config(
                    "missing prompt: pass --prompt or pipe stdin".to_string(),
                ));
            }
            trimmed
        }
    };

    let outcome = run(config, OfflineLlmClient, RunRequest { prompt }).await?;
    println!("{}", outcome.reasoning);
    for action in &outcome.actions {
        println!("{}", serde_json::to_string_pretty(action)?);
    }
    Ok(())
}

fn take_arg(flag: &str, remaining: &mut Vec<String>) -> Result<String, BrainError> {
    if remaining.is_empty() {
        return Err(BrainError::Config(format!("missing value for {flag}")));
    }
    Ok(remaining.remove(0))
}

fn print_usage() {
    println!(
        "brain run [--config brain.json] [--prompt TEXT] [--repo-root PATH]\n\
reads a prompt from --prompt or stdin, runs the Planner to completion, and prints its\n\
reasoning followed by the actions it would submit."
    );
}
