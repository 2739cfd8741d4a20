use super::{Payload, ToolError, ToolResult};
use crate::sandbox::{absolutize, SandboxRoots};
use serde_json::{json, Value};
use std::path::Path;

pub const NAME: &str = "list_dir";

pub fn schema() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": NAME,
            "description": "List directory contents (names only). Use to check existing skills before creating a new one to avoid duplicates.",
            "parameters": {
                "type": "object",
                "properties": {
                    "dir_path": { "type": "string", "description": "Path to the directory to list." }
                },
                "required": ["dir_path"]
            }
        }
    })
}

/// Entry names of a directory under one of `roots`, sorted.
pub fn list_dir(path: &Path, roots: &SandboxRoots) -> ToolResult {
    let abs = absolutize(path);
    if roots.matching_root(&abs).is_none() {
        return ToolError::PathNotAllowed {
            path: abs,
            roots: roots.to_string(),
        }
        .into();
    }
    if !abs.is_dir() {
        return ToolError::NotFound {
            kind: "directory",
            path: abs,
        }
        .into();
    }

    let read_dir = match std::fs::read_dir(&abs) {
        Ok(rd) => rd,
        Err(source) => return ToolError::Io { path: abs, source }.into(),
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        match entry {
            Ok(e) => entries.push(e.file_name().to_string_lossy().into_owned()),
            Err(source) => return ToolError::Io { path: abs, source }.into(),
        }
    }
    entries.sort();

    ToolResult::ok(Payload::Entries(entries))
}
