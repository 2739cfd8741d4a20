//! Summarize skills from one agent log file.

use crate::agent::{RunResult, SkillSummarizer};
use crate::config::Config;
use crate::llm::LlmClient;
use crate::sandbox::absolutize;
use crate::transcript::Transcript;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lines of the log embedded directly in the task message.
const PREVIEW_LINES: usize = 50;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Log file not found: {}", .0.display())]
    LogNotFound(PathBuf),

    #[error("failed to read log {}: {source}", path.display())]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Agent(#[from] anyhow::Error),
}

/// Inputs for one summarization run.
#[derive(Debug, Clone)]
pub struct SummarizeRequest {
    /// Relative to `project_root` unless absolute; any extension.
    pub log_path: String,
    pub project_root: PathBuf,
    pub output_root: PathBuf,
    /// Keep only the last N non-empty lines; `None` or 0 keeps all.
    pub last_n: Option<usize>,
}

/// The subset of a log that is shown to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogExcerpt {
    pub lines: Vec<String>,
}

impl LogExcerpt {
    /// Trim every line, drop blank ones, then apply `last_n`.
    pub fn from_text(text: &str, last_n: Option<usize>) -> Self {
        let mut lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if let Some(n) = last_n.filter(|n| *n > 0) {
            if lines.len() > n {
                lines.drain(..lines.len() - n);
            }
        }
        Self { lines }
    }

    pub fn total(&self) -> usize {
        self.lines.len()
    }

    pub fn preview(&self) -> String {
        let shown = self.lines.len().min(PREVIEW_LINES);
        let mut preview = self.lines[..shown].join("\n");
        if self.lines.len() > PREVIEW_LINES {
            preview.push_str(&format!(
                "\n... ({} lines total; use read_file for more.)",
                self.lines.len()
            ));
        }
        preview
    }
}

pub fn build_task_message(log_path: &str, excerpt: &LogExcerpt, output_root: &Path) -> String {
    format!(
        r#"Extract reusable skills from the agent log below and write SKILL.md files following the summarizing-new-skills spec.

Log path: {log_path}
Total lines: {total}. First {PREVIEW_LINES} lines:

---
{preview}
---

First list_dir on {out} to avoid duplicates, then analyze repeated successful patterns, then write_file new SKILL.md(s)."#,
        total = excerpt.total(),
        preview = excerpt.preview(),
        out = output_root.display(),
    )
}

/// Resolve and read the log, then run one summarizer loop over it.
///
/// A missing log fails before any model round is spent.
pub fn summarize_skills_from_log<C: LlmClient>(
    request: &SummarizeRequest,
    config: &Config,
    client: C,
    transcript: Option<Transcript>,
) -> Result<RunResult, SummarizeError> {
    let project_root = absolutize(&request.project_root);
    let output_root = absolutize(&request.output_root);

    let log = Path::new(&request.log_path);
    let abs_log = if log.is_absolute() {
        log.to_path_buf()
    } else {
        project_root.join(log)
    };
    if !abs_log.is_file() {
        return Err(SummarizeError::LogNotFound(abs_log));
    }

    let text = std::fs::read_to_string(&abs_log).map_err(|source| SummarizeError::LogRead {
        path: abs_log.clone(),
        source,
    })?;
    let excerpt = LogExcerpt::from_text(&text, request.last_n);
    tracing::info!(log = %abs_log.display(), lines = excerpt.total(), "loaded log");

    let user_message = build_task_message(&request.log_path, &excerpt, &output_root);

    let mut agent = SkillSummarizer::new(&project_root, &output_root, config, client)?;
    if let Some(t) = transcript {
        agent = agent.with_transcript(t);
    }
    Ok(agent.run(&user_message, &[])?)
}
