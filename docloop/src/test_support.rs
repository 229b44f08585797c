//! Test-only helpers: scripted agents and fixture builders.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::io::agent::Agent;
use crate::io::config::{AgentCommandConfig, RunConfig};

/// Agent that returns queued responses in order and records every call.
pub struct ScriptedAgent {
    responses: RefCell<VecDeque<String>>,
    calls: RefCell<Vec<(String, u32)>>,
}

impl ScriptedAgent {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Prompts and output-token caps received so far, in call order.
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.borrow().clone()
    }

    /// Error if scripted responses remain unconsumed.
    pub fn assert_drained(&self) -> Result<()> {
        let remaining = self.responses.borrow().len();
        if remaining > 0 {
            return Err(anyhow!("{remaining} scripted responses left unconsumed"));
        }
        Ok(())
    }
}

impl Agent for ScriptedAgent {
    fn invoke(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        self.calls
            .borrow_mut()
            .push((prompt.to_string(), max_output_tokens));
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted agent exhausted"))
    }
}

/// Config writing into `<root>/out`, with an agent command that must never run.
pub fn test_config(root: &Path) -> RunConfig {
    RunConfig {
        topic: "test topic".to_string(),
        output_dir: root.join("out"),
        dialogue_log: Some(root.join("dialogue_log.md")),
        agent: AgentCommandConfig {
            command: vec!["false".to_string()],
            ..AgentCommandConfig::default()
        },
        ..RunConfig::default()
    }
}

/// A temporary run root and a [`test_config`] pointing into it.
///
/// The directory is removed when the value is dropped.
pub struct TempRun {
    pub dir: TempDir,
    pub config: RunConfig,
}

impl TempRun {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp run directory")?;
        let config = test_config(dir.path());
        Ok(Self { dir, config })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Writer response wrapping `content` in a fenced JSON payload with some prose.
pub fn writer_json(content: &str) -> String {
    let payload = serde_json::json!({ "mainContent": content });
    format!("Here is the revised document.\n```json\n{payload}\n```\n")
}

/// Reviewer response with the given feedback and verdict.
pub fn reviewer_json(feedback: &str, complete: bool) -> String {
    let payload = serde_json::json!({ "feedback": feedback, "isComplete": complete });
    format!("My review:\n```json\n{payload}\n```")
}
