//! Context assembly: rule files, extra files and directory trees.
//!
//! Built once per run and reused unmodified by every round. Unreadable inputs
//! contribute nothing; a missing optional file never aborts the run.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::truncate::truncate_to;
use crate::core::types::Role;
use crate::io::config::RunConfig;
use crate::io::read::read_or_empty;

/// Static reference text shared by all rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentContext {
    /// Labeled context files and directory contents.
    pub context: String,
    pub writer_rules: String,
    pub reviewer_rules: String,
}

impl AgentContext {
    /// Read every configured rule and context source.
    pub fn assemble(config: &RunConfig) -> Self {
        let limit = config.context_limit;
        let files = truncate_to(&load_files(&config.context_files, limit), limit);
        let dirs = truncate_to(&load_dirs(&config.context_dirs, limit), limit);
        let context = join_sections([files, dirs]);

        let assembled = Self {
            context,
            writer_rules: truncate_to(&load_rules(&config.writer_rules), limit),
            reviewer_rules: truncate_to(&load_rules(&config.reviewer_rules), limit),
        };
        info!(
            context_chars = assembled.context.chars().count(),
            writer_rules_chars = assembled.writer_rules.chars().count(),
            reviewer_rules_chars = assembled.reviewer_rules.chars().count(),
            "context assembled"
        );
        assembled
    }

    pub fn rules(&self, role: Role) -> &str {
        match role {
            Role::Writer => &self.writer_rules,
            Role::Reviewer => &self.reviewer_rules,
        }
    }
}

/// Trimmed, non-empty rule file contents joined by blank lines.
pub fn load_rules(paths: &[PathBuf]) -> String {
    join_sections(paths.iter().map(|path| read_or_empty(path).trim().to_string()))
}

/// Each file labeled by its path and truncated independently to `limit`.
pub fn load_files(paths: &[PathBuf], limit: Option<usize>) -> String {
    join_sections(paths.iter().map(|path| labeled(path, limit)))
}

/// Every file under each root, depth-first in filesystem order, labeled by full path.
pub fn load_dirs(roots: &[PathBuf], limit: Option<usize>) -> String {
    let mut sections = Vec::new();
    for root in roots {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(root = %root.display(), err = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() {
                sections.push(labeled(entry.path(), limit));
            }
        }
    }
    join_sections(sections)
}

fn labeled(path: &Path, limit: Option<usize>) -> String {
    let contents = read_or_empty(path);
    if contents.trim().is_empty() {
        return String::new();
    }
    format!("### {}\n{}", path.display(), truncate_to(&contents, limit))
}

fn join_sections(sections: impl IntoIterator<Item = String>) -> String {
    sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::truncate::TRUNCATION_MARKER;
    use std::fs;

    #[test]
    fn rules_skip_missing_and_empty_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let a = temp.path().join("a.md");
        let empty = temp.path().join("empty.md");
        let b = temp.path().join("b.md");
        fs::write(&a, "\n  Be concise.  \n").expect("write a");
        fs::write(&empty, "   \n").expect("write empty");
        fs::write(&b, "Use headings.").expect("write b");

        let rules = load_rules(&[a, temp.path().join("missing.md"), empty, b]);
        assert_eq!(rules, "Be concise.\n\nUse headings.");
    }

    #[test]
    fn files_are_labeled_and_truncated_independently() {
        let temp = tempfile::tempdir().expect("tempdir");
        let long = temp.path().join("long.txt");
        let short = temp.path().join("short.txt");
        fs::write(&long, "l".repeat(200)).expect("write long");
        fs::write(&short, "short body").expect("write short");

        let out = load_files(&[long.clone(), short.clone()], Some(50));
        assert!(out.starts_with(&format!("### {}\n", long.display())));
        assert!(out.contains(&format!("{TRUNCATION_MARKER}\n\n### {}", short.display())));
        assert!(out.ends_with("short body"));
    }

    #[test]
    fn dirs_include_nested_files_with_full_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("src");
        fs::create_dir_all(root.join("nested")).expect("mkdir");
        fs::write(root.join("top.rs"), "fn top() {}").expect("write top");
        fs::write(root.join("nested/inner.rs"), "fn inner() {}").expect("write inner");

        let out = load_dirs(&[root.clone(), temp.path().join("missing")], None);
        assert!(out.contains(&format!("### {}\nfn top() {{}}", root.join("top.rs").display())));
        assert!(out.contains(&format!(
            "### {}\nfn inner() {{}}",
            root.join("nested/inner.rs").display()
        )));
    }

    #[test]
    fn assemble_splits_rules_by_role_and_caps_context() {
        let temp = tempfile::tempdir().expect("tempdir");
        let writer_rule = temp.path().join("writer.md");
        let reviewer_rule = temp.path().join("reviewer.md");
        let ctx_file = temp.path().join("notes.md");
        fs::write(&writer_rule, "write well").expect("write");
        fs::write(&reviewer_rule, "review hard").expect("write");
        fs::write(&ctx_file, "n".repeat(1_000)).expect("write");

        let config = RunConfig {
            topic: "t".to_string(),
            context_files: vec![ctx_file],
            writer_rules: vec![writer_rule],
            reviewer_rules: vec![reviewer_rule],
            context_limit: Some(100),
            ..RunConfig::default()
        };
        let ctx = AgentContext::assemble(&config);

        assert_eq!(ctx.rules(Role::Writer), "write well");
        assert_eq!(ctx.rules(Role::Reviewer), "review hard");
        assert!(ctx.context.chars().count() <= 100);
        assert!(ctx.context.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn assemble_with_nothing_configured_is_empty() {
        let config = RunConfig {
            topic: "t".to_string(),
            ..RunConfig::default()
        };
        assert_eq!(AgentContext::assemble(&config), AgentContext::default());
    }
}
