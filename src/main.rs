mod agent;
mod config;
mod llm;
mod prompts;
mod sandbox;
mod summarize;
mod tools;
mod transcript;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use summarize::{SummarizeError, SummarizeRequest};
use tracing::{info, warn};

const MAX_PRINTED_RESPONSE: usize = 2000;

#[derive(Parser)]
#[command(
    name = "skillsum",
    about = "Extract reusable SKILL.md files from an agent log (JSONL)"
)]
pub struct Args {
    #[arg(
        long,
        default_value = "agent_log",
        help = "Log file, relative to project root or absolute; any extension, read as text"
    )]
    pub log_path: String,

    #[arg(long, help = "Root for reading logs (default: current directory)")]
    pub project_root: Option<PathBuf>,

    #[arg(long, help = "Root for writing generated skills")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_name = "N", help = "Use only the last N lines of the log")]
    pub last: Option<usize>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Chat endpoint base URL (overrides config and env)")]
    pub base_url: Option<String>,

    #[arg(long, help = "API key (overrides config and env)")]
    pub api_key: Option<String>,

    #[arg(long, help = "Model identifier")]
    pub model: Option<String>,

    #[arg(long = "max-turns", value_name = "N", help = "Maximum tool-call rounds (default: 20)")]
    pub max_turns: Option<usize>,

    #[arg(long, help = "Skill catalogue injected into the system prompt")]
    pub skill_file: Option<PathBuf>,

    #[arg(long, help = "Append a JSONL transcript of the run to this file")]
    pub transcript: Option<PathBuf>,

    #[arg(long, help = "Print the run result as JSON")]
    pub json: bool,

    #[arg(long, help = "Verbose output (log every round)")]
    pub verbose: bool,

    #[arg(long, help = "Debug output (HTTP and tracing detail)")]
    pub debug: bool,
}

fn init_logging(args: &Args) {
    let default_level = if args.debug {
        "trace"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();
}

fn load_config(args: &Args) -> Result<config::Config> {
    let mut cfg = if let Some(path) = &args.config {
        config::Config::load_from(path)?
    } else {
        config::Config::load()?
    };
    cfg.apply_env()?;

    if let Some(v) = &args.base_url {
        cfg.llm.base_url = v.clone();
    }
    if let Some(v) = &args.api_key {
        cfg.llm.api_key = v.clone();
    }
    if let Some(v) = &args.model {
        cfg.llm.model = v.clone();
    }
    if let Some(v) = args.max_turns {
        cfg.agent.max_turns = v;
    }
    if let Some(v) = &args.project_root {
        cfg.agent.project_root = Some(v.clone());
    }
    if let Some(v) = &args.output_dir {
        cfg.agent.output_dir = v.clone();
    }
    if let Some(v) = &args.skill_file {
        cfg.agent.skill_file = Some(v.clone());
    }

    if let Err(errors) = cfg.validate() {
        let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(anyhow::anyhow!("Invalid configuration:\n  {}", joined.join("\n  ")));
    }
    if cfg.llm.api_key.is_empty() {
        warn!("no API key configured; requests will be sent unauthenticated");
    }
    Ok(cfg)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(&args);

    let cfg = load_config(&args)?;

    let cwd = std::env::current_dir()?;
    let project_root = sandbox::absolutize(cfg.agent.project_root.as_deref().unwrap_or(&cwd));
    let output_root = sandbox::absolutize(&cfg.agent.output_dir);

    info!(project_root = %project_root.display(), "project root");
    info!(log_path = %args.log_path, "log path");
    info!(output_dir = %output_root.display(), "output dir");
    if let Some(n) = args.last {
        info!(last = n, "last N lines");
    }

    let transcript = match &args.transcript {
        Some(path) => {
            let run_id = uuid::Uuid::new_v4().to_string();
            Some(transcript::Transcript::new(path, &run_id, &cwd)?)
        }
        None => None,
    };

    let client = llm::Client::new(
        &cfg.llm.base_url,
        &cfg.llm.api_key,
        Duration::from_secs(cfg.llm.timeout_secs),
    );
    let request = SummarizeRequest {
        log_path: args.log_path.clone(),
        project_root,
        output_root,
        last_n: args.last,
    };

    let result = match summarize::summarize_skills_from_log(&request, &cfg, client, transcript) {
        Ok(r) => r,
        Err(e @ SummarizeError::LogNotFound(_)) => {
            println!("\n[FAIL] {}", e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.success {
        println!("\n[OK] Skill summarizer finished.");
        if let Some(text) = result.final_response.as_deref().filter(|t| !t.is_empty()) {
            println!("\n--- Agent final response ---");
            println!("{}", truncate_chars(text, MAX_PRINTED_RESPONSE));
        }
    } else {
        println!("\n[FAIL] Skill summarizer did not finish successfully.");
        if let Some(text) = &result.final_response {
            println!("{}", text);
        }
    }
    if !args.json {
        println!("\nTool calls made: {}", result.tool_calls.len());
    }

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
