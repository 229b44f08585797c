//! Prompt templates for the writer and reviewer.
//!
//! Embedded defaults can be replaced per role with a template file.

use std::path::Path;

use tracing::{debug, warn};

use crate::core::types::Role;
use crate::io::config::RunConfig;
use crate::io::read::read_or_empty;

const WRITER_TEMPLATE: &str = include_str!("prompts/writer.md");
const REVIEWER_TEMPLATE: &str = include_str!("prompts/reviewer.md");

/// Template sources for both roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub writer: String,
    pub reviewer: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            writer: WRITER_TEMPLATE.to_string(),
            reviewer: REVIEWER_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Load configured templates, falling back to the embedded defaults.
    pub fn load(config: &RunConfig) -> Self {
        Self {
            writer: load_or_default(Role::Writer, config.writer_prompt.as_deref(), WRITER_TEMPLATE),
            reviewer: load_or_default(
                Role::Reviewer,
                config.reviewer_prompt.as_deref(),
                REVIEWER_TEMPLATE,
            ),
        }
    }

    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::Writer => &self.writer,
            Role::Reviewer => &self.reviewer,
        }
    }
}

fn load_or_default(role: Role, path: Option<&Path>, fallback: &str) -> String {
    let Some(path) = path else {
        return fallback.to_string();
    };
    let contents = read_or_empty(path);
    if contents.trim().is_empty() {
        warn!(%role, path = %path.display(), "prompt template empty or unreadable; using built-in");
        return fallback.to_string();
    }
    debug!(%role, path = %path.display(), "loaded prompt template");
    contents
}
