//! Reviewer step: read back what the writer persisted and decide whether it is done.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, instrument};

use crate::core::extract::extract_payload;
use crate::core::template::{Bindings, render};
use crate::core::tokens::CallTokens;
use crate::core::truncate::truncate_to;
use crate::core::types::{ReviewerOutput, Role};
use crate::io::agent::Agent;
use crate::io::artifacts::read_artifacts;
use crate::io::config::RunConfig;
use crate::io::context::AgentContext;
use crate::io::read::read_or_empty;

/// Substituted when the main file is empty.
pub const NO_MAIN_CONTENT: &str = "(no main content)";
/// Substituted when the writer produced no additional files.
pub const NO_ADDITIONAL_FILES: &str = "(no additional files)";

/// Result of one reviewer invocation.
#[derive(Debug, Clone)]
pub struct ReviewerRound {
    pub output: ReviewerOutput,
    pub tokens: CallTokens,
}

impl ReviewerRound {
    pub fn feedback(&self) -> &str {
        self.output.feedback()
    }

    pub fn is_complete(&self) -> bool {
        self.output.is_complete()
    }
}

/// Reviewer step bound to the run's static inputs.
#[derive(Debug, Clone, Copy)]
pub struct ReviewerStep<'a> {
    pub config: &'a RunConfig,
    pub context: &'a AgentContext,
    pub template: &'a str,
}

impl ReviewerStep<'_> {
    /// Render the reviewer prompt from the artifacts currently on disk.
    ///
    /// `primary_path` is where the writer actually wrote this round.
    pub fn build_prompt(&self, primary_path: &Path, secondary_paths: &[PathBuf]) -> Result<String> {
        let limit = self.config.context_limit;

        let primary = truncate_to(&read_or_empty(primary_path), limit);
        let main_content = if primary.trim().is_empty() {
            NO_MAIN_CONTENT.to_string()
        } else {
            primary
        };

        let additional_content = if secondary_paths.is_empty() {
            NO_ADDITIONAL_FILES.to_string()
        } else {
            read_artifacts(secondary_paths)
                .iter()
                .map(|(path, content)| {
                    format!("### {}\n{}", path.display(), truncate_to(content, limit))
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let mut bindings = Bindings::new();
        bindings.insert("topic", self.config.topic.clone());
        bindings.insert("rules", self.context.rules(Role::Reviewer).to_string());
        bindings.insert("context", self.context.context.clone());
        bindings.insert("main_file", primary_path.display().to_string());
        bindings.insert("main_content", main_content);
        bindings.insert("additional_content", additional_content);
        render(self.template, &bindings)
    }

    /// Invoke the reviewer and parse its verdict.
    #[instrument(skip_all, fields(main = %primary_path.display()))]
    pub fn run<A: Agent>(
        &self,
        agent: &A,
        primary_path: &Path,
        secondary_paths: &[PathBuf],
    ) -> Result<ReviewerRound> {
        let prompt = self.build_prompt(primary_path, secondary_paths)?;
        let response = agent.invoke(&prompt, self.config.max_output_tokens)?;
        let tokens = CallTokens::estimate(&prompt, &response);
        let output: ReviewerOutput = extract_payload(Role::Reviewer, &response)?;
        info!(
            complete = output.is_complete(),
            feedback_chars = output.feedback().chars().count(),
            "reviewer verdict"
        );
        Ok(ReviewerRound {
            output,
            tokens,
        })
    }
}
