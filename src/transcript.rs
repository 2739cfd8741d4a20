//! Append-only JSONL audit log of one summarizer run.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct Transcript {
    pub path: PathBuf,
    run_id: String,
    cwd: PathBuf,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    run_id: &'a str,
    cwd: &'a Path,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: Value,
}

impl Transcript {
    pub fn new(path: &Path, run_id: &str, cwd: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            run_id: run_id.to_string(),
            cwd: cwd.to_path_buf(),
            file,
        })
    }

    pub fn log(&mut self, event_type: &str, data: Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            run_id: &self.run_id,
            cwd: &self.cwd,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn run_start(&mut self, model: &str, max_turns: usize, output_root: &Path) -> Result<()> {
        self.log(
            "run_start",
            json!({ "model": model, "max_turns": max_turns, "output_root": output_root }),
        )
    }

    pub fn model_response(&mut self, turn: usize, tool_calls: usize) -> Result<()> {
        self.log(
            "model_response",
            json!({ "turn": turn, "tool_calls": tool_calls }),
        )
    }

    pub fn tool_call(&mut self, tool: &str, args: &Value) -> Result<()> {
        self.log("tool_call", json!({ "tool": tool, "args": args }))
    }

    pub fn tool_result(&mut self, tool: &str, ok: bool, result: &Value) -> Result<()> {
        self.log(
            "tool_result",
            json!({ "tool": tool, "ok": ok, "result": result }),
        )
    }

    pub fn run_end(&mut self, success: bool, turns: usize, tool_calls: usize) -> Result<()> {
        self.log(
            "run_end",
            json!({ "success": success, "turns": turns, "tool_calls": tool_calls }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_events_are_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runs/run.jsonl");
        let mut t = Transcript::new(&path, "run-1", dir.path()).unwrap();
        t.run_start("m", 3, Path::new("/out")).unwrap();
        t.tool_call("list_dir", &json!({"dir_path": "/out"})).unwrap();
        t.run_end(true, 2, 1).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "run_start");
        assert_eq!(lines[0]["run_id"], "run-1");
        assert_eq!(lines[1]["tool"], "list_dir");
        assert_eq!(lines[2]["success"], true);
        assert!(lines[2]["ts"].is_string());
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.jsonl");
        Transcript::new(&path, "a", dir.path())
            .unwrap()
            .model_response(1, 0)
            .unwrap();
        Transcript::new(&path, "b", dir.path())
            .unwrap()
            .model_response(1, 2)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
