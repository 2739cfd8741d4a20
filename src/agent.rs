//! Bounded tool-calling loop that drives the skill summarizer.

use crate::{
    config::{Config, LlmConfig},
    llm::{self, LlmClient},
    prompts,
    tools::{self, ToolContext, ToolResult},
    transcript::Transcript,
};
use anyhow::{anyhow, Context as _, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One executed tool call, in the order the model requested it.
#[derive(Debug, Clone, Serialize)]
pub struct ToolTrace {
    pub name: String,
    pub arguments: Value,
    pub result: ToolResult,
}

/// Outcome of a single `run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub success: bool,
    pub message: String,
    pub turns: usize,
    pub tool_calls: Vec<ToolTrace>,
    pub final_response: Option<String>,
}

/// Agent that extracts reusable SKILL.md files from execution logs.
pub struct SkillSummarizer<C> {
    client: C,
    llm: LlmConfig,
    max_turns: usize,
    tools: ToolContext,
    system_message: String,
    transcript: Option<RefCell<Transcript>>,
}

impl<C: LlmClient> SkillSummarizer<C> {
    /// Build an agent that may read under `project_root` and `output_root`
    /// and write only under `output_root`, which is created if missing.
    pub fn new(project_root: &Path, output_root: &Path, config: &Config, client: C) -> Result<Self> {
        let project_root = crate::sandbox::absolutize(project_root);
        let output_root = crate::sandbox::absolutize(output_root);
        std::fs::create_dir_all(&output_root)
            .with_context(|| format!("creating output dir {}", output_root.display()))?;

        let skill_file: PathBuf = config
            .agent
            .skill_file
            .clone()
            .unwrap_or_else(prompts::default_skill_file);
        let skill_content = prompts::load_skill_context(&skill_file);
        let system_message = prompts::build_system_message(&skill_content, &output_root);

        Ok(Self {
            client,
            llm: config.llm.clone(),
            max_turns: config.agent.max_turns,
            tools: ToolContext::new(project_root, output_root),
            system_message,
            transcript: None,
        })
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = Some(RefCell::new(transcript));
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    pub fn project_root(&self) -> &Path {
        &self.tools.project_root
    }

    pub fn output_root(&self) -> &Path {
        &self.tools.output_root
    }

    // Transcript failures never abort a run.
    fn record(&self, f: impl FnOnce(&mut Transcript) -> Result<()>) {
        if let Some(t) = &self.transcript {
            if let Err(e) = f(&mut t.borrow_mut()) {
                debug!(error = %e, "transcript write failed");
            }
        }
    }

    /// Run one summarization task.
    ///
    /// `initial_messages` are placed between the system message and the
    /// task. Errors are transport failures only; tool failures are fed back
    /// to the model.
    pub fn run(&self, user_message: &str, initial_messages: &[Value]) -> Result<RunResult> {
        let mut messages = vec![json!({
            "role": "system",
            "content": self.system_message
        })];
        messages.extend(initial_messages.iter().cloned());
        messages.push(json!({
            "role": "user",
            "content": user_message
        }));

        let tool_schemas = tools::schemas();
        let mut trace: Vec<ToolTrace> = Vec::new();

        self.record(|t| t.run_start(&self.llm.model, self.max_turns, &self.tools.output_root));

        for turn in 1..=self.max_turns {
            debug!(turn, max_turns = self.max_turns, "starting round");

            let request = llm::ChatRequest {
                model: self.llm.model.clone(),
                messages: messages.clone(),
                tools: Some(tool_schemas.clone()),
                tool_choice: Some("auto".to_string()),
                temperature: Some(self.llm.temperature),
                max_completion_tokens: Some(self.llm.max_tokens),
            };

            let response = self.client.chat(&request)?;
            if let Some(usage) = &response.usage {
                debug!(
                    turn,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "usage"
                );
            }

            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("model returned no choices"))?;

            if choice.finish_reason.as_deref() == Some("length") {
                warn!(turn, "response truncated (max tokens reached)");
            }

            let msg = choice.message;
            let tool_calls = match msg.tool_calls {
                Some(tc) if !tc.is_empty() => tc,
                _ => {
                    self.record(|t| t.model_response(turn, 0));
                    self.record(|t| t.run_end(true, turn, trace.len()));
                    info!(turn, tool_calls = trace.len(), "model finished");
                    return Ok(RunResult {
                        success: true,
                        message: user_message.to_string(),
                        turns: turn,
                        tool_calls: trace,
                        final_response: Some(msg.content.unwrap_or_default()),
                    });
                }
            };

            self.record(|t| t.model_response(turn, tool_calls.len()));
            if let Some(content) = msg.content.as_deref().filter(|c| !c.is_empty()) {
                debug!(turn, "assistant: {}", content);
            }

            messages.push(json!({
                "role": "assistant",
                "content": msg.content.clone().unwrap_or_default(),
                "tool_calls": tool_calls
            }));

            for tc in &tool_calls {
                let name = tc.function.name.as_str();
                let args = parse_arguments(&tc.function.arguments);

                self.record(|t| t.tool_call(name, &args));
                let result = tools::dispatch(name, &args, &self.tools);
                let result_json = serde_json::to_value(&result)?;
                self.record(|t| t.tool_result(name, result.success, &result_json));

                info!(
                    turn,
                    tool = name,
                    success = result.success,
                    error = result.error.as_deref().unwrap_or(""),
                    "tool call"
                );

                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": tc.id,
                    "content": serde_json::to_string(&result_json)?
                }));

                trace.push(ToolTrace {
                    name: name.to_string(),
                    arguments: args,
                    result,
                });
            }
        }

        warn!(max_turns = self.max_turns, "turn budget exhausted without a final answer");
        self.record(|t| t.run_end(false, self.max_turns, trace.len()));

        Ok(RunResult {
            success: false,
            message: user_message.to_string(),
            turns: self.max_turns,
            tool_calls: trace,
            final_response: None,
        })
    }
}

/// Decode a tool call's argument text. Anything that is not a JSON object
/// becomes `{}`.
fn parse_arguments(raw: &str) -> Value {
    // TODO: report malformed argument JSON to the model as its own error
    // code instead of folding it into `invalid_arguments`.
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ Value::Object(_)) => v,
        Ok(_) | Err(_) => json!({}),
    }
}
