use super::{Payload, ToolError, ToolResult};
use crate::sandbox::{absolutize, SandboxRoots};
use serde_json::{json, Value};
use std::path::Path;

pub const NAME: &str = "read_file";

pub fn schema() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": NAME,
            "description": "Read the contents of a file. Allowed paths: under project root (e.g. agent log JSONL, configs) or under the skills output directory.",
            "parameters": {
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path to the file (relative to project root or absolute)." }
                },
                "required": ["file_path"]
            }
        }
    })
}

/// Read a whole UTF-8 file that lies under one of `roots`.
pub fn read_file(path: &Path, roots: &SandboxRoots) -> ToolResult {
    let abs = absolutize(path);
    if roots.matching_root(&abs).is_none() {
        return ToolError::PathNotAllowed {
            path: abs,
            roots: roots.to_string(),
        }
        .into();
    }
    if !abs.is_file() {
        return ToolError::NotFound {
            kind: "file",
            path: abs,
        }
        .into();
    }

    match std::fs::read_to_string(&abs) {
        Ok(content) => ToolResult::ok(Payload::Content(content)),
        Err(source) => ToolError::Io { path: abs, source }.into(),
    }
}
