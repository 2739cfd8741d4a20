//! The three sandboxed file tools and their dispatcher.

mod list;
mod read;
mod write;

pub use list::list_dir;
pub use read::read_file;
pub use write::write_file;

use crate::sandbox::SandboxRoots;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures a tool reports back to the model as an ordinary result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Path not allowed: {}. Allowed roots: {roots}", path.display())]
    PathNotAllowed { path: PathBuf, roots: String },

    #[error("Not a {kind} or not found: {}", path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: &'static str, message: String },
}

impl ToolError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PathNotAllowed { .. } => "path_not_allowed",
            Self::NotFound { .. } => "not_found",
            Self::Io { .. } => "io_error",
            Self::UnknownTool(_) => "unknown_tool",
            Self::InvalidArguments { .. } => "invalid_arguments",
        }
    }
}

/// What a successful tool call produced. Serialized under its own key so the
/// model sees `content`, `entries` or `path` next to `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Content(String),
    Entries(Vec<String>),
    Path(PathBuf),
}

/// Uniform result record shared by all three tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(flatten)]
    pub payload: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(payload: Payload) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            code: None,
            error: None,
        }
    }

    pub fn failure(err: &ToolError) -> Self {
        Self {
            success: false,
            payload: None,
            code: Some(err.code()),
            error: Some(err.to_string()),
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Content(c)) => Some(c),
            _ => None,
        }
    }

    pub fn entries(&self) -> Option<&[String]> {
        match &self.payload {
            Some(Payload::Entries(e)) => Some(e),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.payload {
            Some(Payload::Path(p)) => Some(p),
            _ => None,
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        Self::failure(&err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadArgs {
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteArgs {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListArgs {
    pub dir_path: String,
}

/// A validated tool request. The tool set is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    Read(ReadArgs),
    Write(WriteArgs),
    List(ListArgs),
}

impl ToolRequest {
    pub fn parse(name: &str, args: &Value) -> Result<Self, ToolError> {
        match name {
            read::NAME => Ok(Self::Read(parse_args(read::NAME, args)?)),
            write::NAME => Ok(Self::Write(parse_args(write::NAME, args)?)),
            list::NAME => Ok(Self::List(parse_args(list::NAME, args)?)),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &'static str, args: &Value) -> Result<T, ToolError> {
    serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidArguments {
        tool,
        message: e.to_string(),
    })
}

/// Directories a dispatch resolves against and is sandboxed to.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Base for relative read/list paths.
    pub project_root: PathBuf,
    pub read_roots: SandboxRoots,
    /// The only write root; also the base for relative write paths.
    pub output_root: PathBuf,
}

impl ToolContext {
    pub fn new(project_root: PathBuf, output_root: PathBuf) -> Self {
        let read_roots = SandboxRoots::new([&project_root, &output_root]);
        Self {
            project_root,
            read_roots,
            output_root,
        }
    }

    fn resolve_read(&self, path: &str) -> PathBuf {
        resolve_against(&self.project_root, path)
    }

    fn resolve_write(&self, path: &str) -> PathBuf {
        resolve_against(&self.output_root, path)
    }
}

fn resolve_against(base: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Tool catalogue sent with every model request.
pub fn schemas() -> Vec<Value> {
    vec![read::schema(), write::schema(), list::schema()]
}

/// Execute one tool call. Never fails: every problem becomes a result the
/// model can read.
pub fn dispatch(name: &str, args: &Value, ctx: &ToolContext) -> ToolResult {
    let request = match ToolRequest::parse(name, args) {
        Ok(r) => r,
        Err(e) => return e.into(),
    };

    match request {
        ToolRequest::Read(a) => read_file(&ctx.resolve_read(&a.file_path), &ctx.read_roots),
        ToolRequest::Write(a) => write_file(
            &ctx.resolve_write(&a.file_path),
            &a.content,
            &ctx.output_root,
        ),
        ToolRequest::List(a) => list_dir(&ctx.resolve_read(&a.dir_path), &ctx.read_roots),
    }
}
