//! Writer's view of the current state: what exists now and what was wrong with it.

use std::path::{Path, PathBuf};

use super::truncate::truncate_to;

/// Contents gathered for one state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotInput<'a> {
    pub primary_path: &'a Path,
    pub primary_content: &'a str,
    pub secondary: &'a [(PathBuf, String)],
    pub feedback: &'a str,
}

/// Render the snapshot, truncated as a whole to `limit` characters.
///
/// Sections (main file, additional files, previous note) are omitted when
/// empty and joined by blank lines.
pub fn render_snapshot(input: &SnapshotInput<'_>, limit: Option<usize>) -> String {
    let mut sections = Vec::new();

    if !input.primary_content.trim().is_empty() {
        sections.push(format!(
            "### Current main file: {}\n{}",
            input.primary_path.display(),
            input.primary_content.trim_end()
        ));
    }

    if !input.secondary.is_empty() {
        let files = input
            .secondary
            .iter()
            .map(|(path, content)| format!("#### {}\n{}", path.display(), content.trim_end()))
            .collect::<Vec<_>>()
            .join("\n\n");
        sections.push(format!("### Current additional files\n{files}"));
    }

    if !input.feedback.trim().is_empty() {
        sections.push(format!("### Previous note\n{}", input.feedback.trim()));
    }

    truncate_to(&sections.join("\n\n"), limit)
}
