use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Connection and sampling settings for the chat endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-5.2".to_string()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_timeout_secs() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default)]
    pub project_root: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Skill catalogue injected into the system message.
    #[serde(default)]
    pub skill_file: Option<PathBuf>,
}

fn default_max_turns() -> usize {
    20
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            project_root: None,
            output_dir: default_output_dir(),
            skill_file: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// A config file as written on disk; every field is optional so layers can
/// override only what they set.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigLayer {
    #[serde(default)]
    llm: LlmLayer,
    #[serde(default)]
    agent: AgentLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LlmLayer {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AgentLayer {
    max_turns: Option<usize>,
    project_root: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    skill_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: project (.skillsum/config.toml) > user (~/.skillsum/config.toml) > built-in
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".skillsum").join("config.toml");
            if user_config.exists() {
                config.merge_file(&user_config)?;
            }
        }

        let project_config = Path::new(".skillsum").join("config.toml");
        if project_config.exists() {
            config.merge_file(&project_config)?;
        }

        Ok(config)
    }

    /// Load configuration from a specific path on top of the built-in defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let layer: ConfigLayer = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        self.merge(layer);
        Ok(())
    }

    fn merge(&mut self, other: ConfigLayer) {
        let llm = other.llm;
        if let Some(v) = llm.base_url {
            self.llm.base_url = v;
        }
        if let Some(v) = llm.api_key {
            self.llm.api_key = v;
        }
        if let Some(v) = llm.model {
            self.llm.model = v;
        }
        if let Some(v) = llm.temperature {
            self.llm.temperature = v;
        }
        if let Some(v) = llm.max_tokens {
            self.llm.max_tokens = v;
        }
        if let Some(v) = llm.timeout_secs {
            self.llm.timeout_secs = v;
        }

        let agent = other.agent;
        if let Some(v) = agent.max_turns {
            self.agent.max_turns = v;
        }
        if agent.project_root.is_some() {
            self.agent.project_root = agent.project_root;
        }
        if let Some(v) = agent.output_dir {
            self.agent.output_dir = v;
        }
        if agent.skill_file.is_some() {
            self.agent.skill_file = agent.skill_file;
        }
    }

    /// Apply environment overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using `lookup` for each variable.
    /// `SKILL_SUMMARIZER_*` names win over the generic `OPENAI_*` ones.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |primary: &str, fallback: Option<&str>| {
            lookup(primary)
                .filter(|v| !v.is_empty())
                .or_else(|| fallback.and_then(&lookup).filter(|v| !v.is_empty()))
        };

        if let Some(v) = get("SKILL_SUMMARIZER_OPENAI_BASE_URL", Some("OPENAI_BASE_URL")) {
            self.llm.base_url = v;
        }
        if let Some(v) = get("SKILL_SUMMARIZER_OPENAI_API_KEY", Some("OPENAI_API_KEY")) {
            self.llm.api_key = v;
        }
        if let Some(v) = get("SKILL_SUMMARIZER_OPENAI_MODEL", Some("OPENAI_MODEL")) {
            self.llm.model = v;
        }
        if let Some(v) = get("SKILL_SUMMARIZER_TEMPERATURE", None) {
            self.llm.temperature = v
                .trim()
                .parse()
                .with_context(|| format!("SKILL_SUMMARIZER_TEMPERATURE: invalid number '{}'", v))?;
        }
        if let Some(v) = get("SKILL_SUMMARIZER_MAX_TOKENS", None) {
            self.llm.max_tokens = v
                .trim()
                .parse()
                .with_context(|| format!("SKILL_SUMMARIZER_MAX_TOKENS: invalid integer '{}'", v))?;
        }
        if let Some(v) = get("SKILL_SUMMARIZER_PROJECT_ROOT", None) {
            self.agent.project_root = Some(PathBuf::from(v));
        }
        if let Some(v) = get("SKILL_SUMMARIZER_OUTPUT_DIR", None) {
            self.agent.output_dir = PathBuf::from(v);
        }
        Ok(())
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.llm.base_url.trim().is_empty() {
            errors.push(ValidationError {
                field: "llm.base_url".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        if self.llm.model.trim().is_empty() {
            errors.push(ValidationError {
                field: "llm.model".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            errors.push(ValidationError {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", self.llm.temperature),
            });
        }

        if self.llm.max_tokens == 0 {
            errors.push(ValidationError {
                field: "llm.max_tokens".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.agent.max_turns == 0 {
            errors.push(ValidationError {
                field: "agent.max_turns".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
