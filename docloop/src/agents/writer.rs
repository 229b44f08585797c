//! Writer step: draft or revise the document and persist it.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::core::extract::extract_payload;
use crate::core::paths::{resolve_primary_path, resolve_secondary_path};
use crate::core::snapshot::{SnapshotInput, render_snapshot};
use crate::core::state::IterationState;
use crate::core::template::{Bindings, render};
use crate::core::tokens::CallTokens;
use crate::core::types::{EmptyContentError, Role, WriterOutput};
use crate::io::agent::Agent;
use crate::io::artifacts::{read_artifacts, write_artifact};
use crate::io::config::RunConfig;
use crate::io::context::AgentContext;
use crate::io::read::read_or_empty;
use crate::io::task::TaskDescription;

/// Contract line shown when the writer may emit additional files.
pub const ADDITIONAL_FILES_ALLOWED: &str =
    "You may add supporting files in `additionalFiles`. They are written next to the main file by base name.";
/// Contract line shown when additional files are disabled.
pub const ADDITIONAL_FILES_DISABLED: &str =
    "Do not emit `additionalFiles`; they will be ignored.";

/// Result of one writer invocation, after its files were written.
#[derive(Debug, Clone)]
pub struct WriterRound {
    pub output: WriterOutput,
    pub primary_path: PathBuf,
    pub secondary_paths: Vec<PathBuf>,
    pub tokens: CallTokens,
}

/// Writer step bound to the run's static inputs.
#[derive(Debug, Clone, Copy)]
pub struct WriterStep<'a> {
    pub config: &'a RunConfig,
    pub task: &'a TaskDescription,
    pub context: &'a AgentContext,
    pub template: &'a str,
}

impl WriterStep<'_> {
    /// Render the template, then append the current state snapshot.
    pub fn build_prompt(&self, state: &IterationState) -> Result<String> {
        let mut bindings = Bindings::new();
        bindings.insert("topic", self.config.topic.clone());
        bindings.insert("task", self.task.text.clone());
        bindings.insert("context", self.context.context.clone());
        bindings.insert("rules", self.context.rules(Role::Writer).to_string());
        bindings.insert(
            "main_file",
            self.config.default_primary_path().display().to_string(),
        );
        let additional_files_rule = if self.config.allow_additional_files {
            ADDITIONAL_FILES_ALLOWED
        } else {
            ADDITIONAL_FILES_DISABLED
        };
        bindings.insert("additional_files_rule", additional_files_rule.to_string());
        let mut prompt = render(self.template, &bindings)?;

        let primary_content = read_or_empty(&state.primary_path);
        let secondary = read_artifacts(&state.secondary_paths);
        let snapshot = render_snapshot(
            &SnapshotInput {
                primary_path: &state.primary_path,
                primary_content: &primary_content,
                secondary: &secondary,
                feedback: &state.feedback,
            },
            self.config.state_limit,
        );
        if !snapshot.is_empty() {
            prompt.push_str("\n\n<current_state>\n");
            prompt.push_str(&snapshot);
            prompt.push_str("\n</current_state>\n");
        }
        Ok(prompt)
    }

    /// Invoke the writer, validate its payload and write the artifacts.
    ///
    /// Blank main content is fatal: nothing is written and [`EmptyContentError`]
    /// is returned.
    #[instrument(skip_all, fields(iteration = state.iteration))]
    pub fn run<A: Agent>(&self, agent: &A, state: &IterationState) -> Result<WriterRound> {
        let prompt = self.build_prompt(state)?;
        let response = agent.invoke(&prompt, self.config.max_output_tokens)?;
        let tokens = CallTokens::estimate(&prompt, &response);
        let output: WriterOutput = extract_payload(Role::Writer, &response)?;

        if output.main_content.trim().is_empty() {
            return Err(EmptyContentError {
                iteration: state.iteration,
            }
            .into());
        }

        let default_path = self.config.default_primary_path();
        let primary_path = resolve_primary_path(
            &self.config.output_dir,
            &default_path,
            output.main_file_path.as_deref(),
        );
        if primary_path != default_path {
            warn!(
                default = %default_path.display(),
                chosen = %primary_path.display(),
                "writer chose a main file path other than the default"
            );
        }
        write_artifact(&primary_path, &output.main_content)?;

        let secondary_paths = self.write_additional_files(&output)?;
        info!(
            main = %primary_path.display(),
            additional = secondary_paths.len(),
            "writer round persisted"
        );

        Ok(WriterRound {
            output,
            primary_path,
            secondary_paths,
            tokens,
        })
    }

    fn write_additional_files(&self, output: &WriterOutput) -> Result<Vec<PathBuf>> {
        let files = output.additional_files();
        if files.is_empty() {
            return Ok(Vec::new());
        }
        if !self.config.allow_additional_files {
            warn!(
                count = files.len(),
                "additional files are disabled; ignoring writer output"
            );
            return Ok(Vec::new());
        }

        let mut written = Vec::new();
        for file in files {
            let Some((requested, content)) = file.parts() else {
                debug!(
                    path = ?file.file_path,
                    "skipping additional file without path or content"
                );
                continue;
            };
            let Some(path) = resolve_secondary_path(&self.config.output_dir, requested) else {
                warn!(requested, "skipping additional file without a file name");
                continue;
            };
            write_artifact(&path, content)?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extract::ExtractionError;
    use crate::io::prompt::PromptTemplates;
    use crate::test_support::{ScriptedAgent, test_config, writer_json};
    use std::fs;

    fn step<'a>(
        config: &'a RunConfig,
        task: &'a TaskDescription,
        context: &'a AgentContext,
        templates: &'a PromptTemplates,
    ) -> WriterStep<'a> {
        WriterStep {
            config,
            task,
            context,
            template: &templates.writer,
        }
    }

    #[test]
    fn prompt_includes_inputs_and_state() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let task = TaskDescription {
            directory: None,
            text: "Explain the cache layers.".to_string(),
        };
        let context = AgentContext {
            context: "### src/cache.rs\nstruct Cache;".to_string(),
            writer_rules: "Prefer short sections.".to_string(),
            reviewer_rules: "reviewer only".to_string(),
        };
        let templates = PromptTemplates::default();
        let state = IterationState {
            feedback: "add examples".to_string(),
            ..IterationState::new(config.default_primary_path())
        };
        fs::create_dir_all(&config.output_dir).expect("mkdir");
        fs::write(config.default_primary_path(), "old draft").expect("write");

        let prompt = step(&config, &task, &context, &templates)
            .build_prompt(&state)
            .expect("prompt");

        assert!(prompt.contains(&config.topic));
        assert!(prompt.contains("Explain the cache layers."));
        assert!(prompt.contains("struct Cache;"));
        assert!(prompt.contains("Prefer short sections."));
        assert!(!prompt.contains("reviewer only"));
        assert!(prompt.contains(&config.default_primary_path().display().to_string()));
        assert!(prompt.contains("old draft"));
        assert!(prompt.contains("### Previous note\nadd examples"));
        assert!(prompt.contains(ADDITIONAL_FILES_ALLOWED));
    }

    #[test]
    fn disabled_additional_files_change_contract_line() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = RunConfig {
            allow_additional_files: false,
            ..test_config(temp.path())
        };
        let templates = PromptTemplates::default();

        let prompt = step(
            &config,
            &TaskDescription::default(),
            &AgentContext::default(),
            &templates,
        )
        .build_prompt(&IterationState::new(config.default_primary_path()))
        .expect("prompt");
        assert!(prompt.contains(ADDITIONAL_FILES_DISABLED));
        assert!(!prompt.contains(ADDITIONAL_FILES_ALLOWED));
    }

    #[test]
    fn custom_template_with_markdown_anchors_runs() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let template = "## Setup {#setup}\nWrite about {{ topic }}.\n{% not a tag %}\n";
        let agent = ScriptedAgent::new(vec![writer_json("# Setup")]);
        let writer = WriterStep {
            config: &config,
            task: &TaskDescription::default(),
            context: &AgentContext::default(),
            template,
        };

        writer
            .run(&agent, &IterationState::new(config.default_primary_path()))
            .expect("run");

        let prompt = &agent.calls()[0].0;
        assert!(prompt.starts_with(&format!(
            "## Setup {{#setup}}\nWrite about {}.\n{{% not a tag %}}\n",
            config.topic
        )));
    }

    #[test]
    fn first_round_prompt_has_no_state_block() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let templates = PromptTemplates::default();
        let state = IterationState::new(config.default_primary_path());

        let prompt = step(
            &config,
            &TaskDescription::default(),
            &AgentContext::default(),
            &templates,
        )
        .build_prompt(&state)
        .expect("prompt");
        assert!(!prompt.contains("<current_state>"));
    }

    #[test]
    fn writes_primary_and_contained_secondary_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let templates = PromptTemplates::default();
        let agent = ScriptedAgent::new(vec![format!(
            "Here is the draft:\n```json\n{}\n```",
            serde_json::json!({
                "mainContent": "# Guide\n",
                "additionalFiles": [
                    {"filePath": "../../etc/passthrough.md", "content": "escaped?"},
                    {"filePath": "notes.md"},
                ]
            })
        )]);
        let state = IterationState::new(config.default_primary_path());

        let round = step(
            &config,
            &TaskDescription::default(),
            &AgentContext::default(),
            &templates,
        )
        .run(&agent, &state)
        .expect("run");

        assert_eq!(round.primary_path, config.default_primary_path());
        assert_eq!(
            fs::read_to_string(&round.primary_path).expect("read main"),
            "# Guide\n"
        );
        let passthrough = config.output_dir.join("passthrough.md");
        assert_eq!(round.secondary_paths, vec![passthrough.clone()]);
        assert_eq!(
            fs::read_to_string(&passthrough).expect("read extra"),
            "escaped?"
        );
        assert!(!temp.path().join("etc").exists());
        assert!(round.tokens.prompt > 0);
        assert_eq!(agent.calls()[0].1, config.max_output_tokens);
        agent.assert_drained().expect("drained");
    }

    #[test]
    fn additional_files_ignored_when_disabled() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = RunConfig {
            allow_additional_files: false,
            ..test_config(temp.path())
        };
        let templates = PromptTemplates::default();
        let agent = ScriptedAgent::new(vec![
            serde_json::json!({
                "mainContent": "body",
                "additionalFiles": [{"filePath": "extra.md", "content": "x"}]
            })
            .to_string(),
        ]);

        let round = step(
            &config,
            &TaskDescription::default(),
            &AgentContext::default(),
            &templates,
        )
        .run(&agent, &IterationState::new(config.default_primary_path()))
        .expect("run");

        assert!(round.secondary_paths.is_empty());
        assert!(!config.output_dir.join("extra.md").exists());
    }

    #[test]
    fn blank_main_content_is_fatal_and_writes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let templates = PromptTemplates::default();
        let agent = ScriptedAgent::new(vec![writer_json("  \n ")]);

        let err = step(
            &config,
            &TaskDescription::default(),
            &AgentContext::default(),
            &templates,
        )
        .run(&agent, &IterationState::new(config.default_primary_path()))
        .unwrap_err();

        let empty = err.downcast_ref::<EmptyContentError>().expect("empty error");
        assert_eq!(empty.iteration, 1);
        assert!(!config.default_primary_path().exists());
    }

    #[test]
    fn unparseable_response_is_an_extraction_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let templates = PromptTemplates::default();
        let agent = ScriptedAgent::new(vec!["sorry, no JSON today".to_string()]);

        let err = step(
            &config,
            &TaskDescription::default(),
            &AgentContext::default(),
            &templates,
        )
        .run(&agent, &IterationState::new(config.default_primary_path()))
        .unwrap_err();

        let extraction = err.downcast_ref::<ExtractionError>().expect("extraction error");
        assert_eq!(extraction.role(), Role::Writer);
    }

    #[test]
    fn explicit_absolute_main_path_is_honoured() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = test_config(temp.path());
        let templates = PromptTemplates::default();
        let target = temp.path().join("elsewhere/guide.md");
        let agent = ScriptedAgent::new(vec![
            serde_json::json!({
                "mainFilePath": target.display().to_string(),
                "mainContent": "moved",
            })
            .to_string(),
        ]);

        let round = step(
            &config,
            &TaskDescription::default(),
            &AgentContext::default(),
            &templates,
        )
        .run(&agent, &IterationState::new(config.default_primary_path()))
        .expect("run");

        assert_eq!(round.primary_path, target);
        assert_eq!(fs::read_to_string(&target).expect("read"), "moved");
        assert!(!config.default_primary_path().exists());
    }
}
