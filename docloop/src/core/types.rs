//! Shared types for the writer/reviewer loop.
//!
//! These define the structured payloads exchanged with agents and the named
//! errors callers need to recognise. They carry no I/O.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the two fixed agent roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Writer,
    Reviewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Writer => "writer",
            Role::Reviewer => "reviewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured payload produced by the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriterOutput {
    /// Explicit main file path; the default path is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_file_path: Option<String>,
    pub main_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_files: Option<Vec<AdditionalFile>>,
}

impl WriterOutput {
    pub fn additional_files(&self) -> &[AdditionalFile] {
        self.additional_files.as_deref().unwrap_or_default()
    }
}

/// Secondary file descriptor emitted by the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalFile {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl AdditionalFile {
    /// Path and content, when both are present and non-empty.
    pub fn parts(&self) -> Option<(&str, &str)> {
        let path = self.file_path.as_deref().filter(|p| !p.trim().is_empty())?;
        let content = self.content.as_deref().filter(|c| !c.is_empty())?;
        Some((path, content))
    }
}

/// Structured payload produced by the reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerOutput {
    #[serde(default)]
    pub feedback: Option<String>,
    /// Kept as raw JSON: only the literal boolean `true` counts as complete.
    #[serde(default)]
    pub is_complete: Value,
}

impl ReviewerOutput {
    pub fn feedback(&self) -> &str {
        self.feedback.as_deref().unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.is_complete, Value::Bool(true))
    }
}

/// The writer returned blank main content, so the round has nothing to persist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("writer returned empty mainContent in iteration {iteration}")]
pub struct EmptyContentError {
    pub iteration: u32,
}
