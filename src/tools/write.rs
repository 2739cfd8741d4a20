use super::{Payload, ToolError, ToolResult};
use crate::sandbox::{absolutize, is_allowed};
use serde_json::{json, Value};
use std::path::Path;

pub const NAME: &str = "write_file";

pub fn schema() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": NAME,
            "description": "Write content to a file. Only allowed under the designated skills output directory. Use for creating new SKILL.md or scripts.",
            "parameters": {
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path for the new file (under output root)." },
                    "content": { "type": "string", "description": "Full content to write (e.g. SKILL.md body)." }
                },
                "required": ["file_path", "content"]
            }
        }
    })
}

/// Write `content` to `path`, which must lie under `output_root`.
///
/// Missing parent directories are created and existing files overwritten.
/// The write is not atomic; a crash mid-write can leave a partial file.
pub fn write_file(path: &Path, content: &str, output_root: &Path) -> ToolResult {
    let abs = absolutize(path);
    if is_allowed(&abs, &[output_root]).is_none() {
        return ToolError::PathNotAllowed {
            path: abs,
            roots: format!("[{}] (writes only)", absolutize(output_root).display()),
        }
        .into();
    }

    if let Some(parent) = abs.parent() {
        if let Err(source) = std::fs::create_dir_all(parent) {
            return ToolError::Io {
                path: parent.to_path_buf(),
                source,
            }
            .into();
        }
    }

    match std::fs::write(&abs, content) {
        Ok(()) => ToolResult::ok(Payload::Path(abs)),
        Err(source) => ToolError::Io { path: abs, source }.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::SandboxRoots;
    use crate::tools::read_file;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("skills/new/SKILL.md");

        let result = write_file(&target, "# Skill\n", out.path());
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.path(), Some(target.as_path()));
        assert!(out.path().join("skills/new").is_dir());
        assert_eq!(fs::read_to_string(&target).unwrap(), "# Skill\n");
    }

    #[test]
    fn test_write_overwrites() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("SKILL.md");
        fs::write(&target, "old content that is longer").unwrap();

        let result = write_file(&target, "new", out.path());
        assert!(result.success);
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_write_outside_root_denied() {
        let out = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();

        let missing = elsewhere.path().join("new/SKILL.md");
        let result = write_file(&missing, "x", out.path());
        assert!(!result.success);
        assert_eq!(result.code, Some("path_not_allowed"));
        assert!(!missing.exists());
        assert!(!elsewhere.path().join("new").exists());

        let existing = elsewhere.path().join("existing.txt");
        fs::write(&existing, "keep").unwrap();
        let result = write_file(&existing, "x", out.path());
        assert!(!result.success);
        assert_eq!(fs::read_to_string(&existing).unwrap(), "keep");
    }

    #[test]
    fn test_write_sibling_prefix_denied() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();

        let result = write_file(&tmp.path().join("output/SKILL.md"), "x", &out);
        assert!(!result.success);
        assert_eq!(result.code, Some("path_not_allowed"));
    }

    #[test]
    fn test_write_dotdot_escape_denied() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();

        let result = write_file(&out.join("../escaped.md"), "x", &out);
        assert!(!result.success);
        assert!(!tmp.path().join("escaped.md").exists());
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("scripts/notes.md");
        let text = "line one\nзначение — ünïcödé ✓\n\n\ttabbed\n";

        assert!(write_file(&target, text, out.path()).success);
        let read = read_file(&target, &SandboxRoots::single(out.path()));
        assert_eq!(read.content(), Some(text));
    }
}
