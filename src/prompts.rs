use std::path::{Path, PathBuf};

/// The catalogue shipped with the crate, used when no skill file is configured.
pub fn default_skill_file() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("SKILL.md")
}

/// Read the skill catalogue. A missing or unreadable file degrades to a
/// warning line so the run can still proceed.
pub fn load_skill_context(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not load skill file");
            format!("[Warning: Could not load skill file: {}]\n", e)
        }
    }
}

pub fn build_system_message(skill_content: &str, output_root: &Path) -> String {
    let out = output_root.display();
    format!(
        r#"# Role
You are a senior AI architect who extracts standardized workflows from messy execution logs and produces SKILL.md files that follow the Agent Skills format.

# Capability: summarizing-new-skills
When given a task to extract skills from agent logs, you must:
1. Use list_dir to inspect the existing skills directory ({out}) and avoid creating duplicates.
2. Use read_file to read the provided agent log (text file, often JSONL: one JSON object per line with e.g. query, api_call_history, collected_info_sources).
3. Apply Pattern Extraction: Success Mining, Context Gap, Variable Abstraction, Hidden Requirements, Decision Logic, Failure Modes.
4. If you identify a reusable multi-step successful workflow, use write_file to produce a new SKILL.md under {out} (name: kebab-case only, no Unicode; description: third person with trigger phrases).
5. Put complex steps in a scripts/ subdir; keep the main SKILL concise (progressive disclosure).

# Rules
- Follow summarizing-new-skills metadata format (name, description, optional compatibility).
- name must be alphanumeric and hyphens only; no Unicode.
- Do not create skills for one-off or trivial instructions; avoid skill bloat.

# Full skill spec (follow strictly)
{skill_content}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_existing_skill_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SKILL.md");
        std::fs::write(&path, "---\nname: x\n---\nbody\n").unwrap();
        assert_eq!(load_skill_context(&path), "---\nname: x\n---\nbody\n");
    }

    #[test]
    fn test_missing_skill_file_placeholder() {
        let dir = TempDir::new().unwrap();
        let text = load_skill_context(&dir.path().join("absent.md"));
        assert!(text.starts_with("[Warning: Could not load skill file:"));
    }

    #[test]
    fn test_bundled_skill_file_exists() {
        assert!(default_skill_file().is_file());
    }

    #[test]
    fn test_system_message_embeds_root_and_catalogue() {
        let msg = build_system_message("CATALOGUE-BODY", Path::new("/out/skills"));
        assert!(msg.contains("existing skills directory (/out/skills)"));
        assert!(msg.contains("new SKILL.md under /out/skills"));
        assert!(msg.trim_end().ends_with("CATALOGUE-BODY"));
    }
}
