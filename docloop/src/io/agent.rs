//! Model invocation boundary.
//!
//! The [`Agent`] trait decouples the loop from the model backend. The loop is
//! handed one agent per role; tests inject scripted agents that return queued
//! payloads without spawning processes.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::core::types::Role;
use crate::io::config::AgentCommandConfig;
use crate::io::process::run_command_with_timeout;

/// Opaque model capability: prompt in, raw text out.
pub trait Agent {
    /// Invoke the model with an output-token ceiling.
    fn invoke(&self, prompt: &str, max_output_tokens: u32) -> Result<String>;
}

/// Agent backed by an external command that reads the prompt on stdin and
/// prints the response on stdout.
#[derive(Debug, Clone)]
pub struct CommandAgent {
    role: Role,
    config: AgentCommandConfig,
    model: Option<String>,
}

impl CommandAgent {
    pub fn new(role: Role, config: &AgentCommandConfig, model: Option<&str>) -> Self {
        Self {
            role,
            config: config.clone(),
            model: model.map(str::to_string),
        }
    }

    fn build_command(&self, max_output_tokens: u32) -> Result<Command> {
        let (program, args) = self
            .config
            .command
            .split_first()
            .ok_or_else(|| anyhow!("agent.command must be a non-empty array"))?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(model) = &self.model {
            cmd.arg(&self.config.model_flag).arg(model);
        }
        if let Some(var) = &self.config.max_tokens_env {
            cmd.env(var, max_output_tokens.to_string());
        }
        Ok(cmd)
    }
}

impl Agent for CommandAgent {
    #[instrument(skip_all, fields(role = %self.role, model = ?self.model, max_output_tokens = max_output_tokens))]
    fn invoke(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        info!(prompt_chars = prompt.chars().count(), "invoking agent");
        let cmd = self.build_command(max_output_tokens)?;
        let output = run_command_with_timeout(
            cmd,
            Some(prompt.as_bytes()),
            Duration::from_secs(self.config.timeout_secs),
            self.config.output_limit_bytes,
        )
        .with_context(|| format!("run {} agent {:?}", self.role, self.config.command))?;

        if output.timed_out {
            warn!(timeout_secs = self.config.timeout_secs, "agent timed out");
            return Err(anyhow!(
                "{} agent timed out after {}s",
                self.role,
                self.config.timeout_secs
            ));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "agent failed");
            return Err(anyhow!(
                "{} agent failed with status {:?}: {}",
                self.role,
                output.status.code(),
                output.stderr_tail(5)
            ));
        }

        let text = output.stdout_text();
        debug!(response_chars = text.chars().count(), "agent responded");
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell_agent(script: &str, model: Option<&str>) -> CommandAgent {
        let config = AgentCommandConfig {
            command: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            max_tokens_env: Some("DOCLOOP_TEST_MAX_TOKENS".to_string()),
            timeout_secs: 10,
            ..AgentCommandConfig::default()
        };
        CommandAgent::new(Role::Writer, &config, model)
    }

    #[test]
    fn prompt_goes_to_stdin_and_stdout_comes_back() {
        let agent = shell_agent("cat", None);
        let out = agent.invoke("the prompt", 100).expect("invoke");
        assert_eq!(out, "the prompt");
    }

    #[test]
    fn token_ceiling_is_exported() {
        let agent = shell_agent("cat >/dev/null; printf '%s' \"$DOCLOOP_TEST_MAX_TOKENS\"", None);
        let out = agent.invoke("ignored", 4096).expect("invoke");
        assert_eq!(out, "4096");
    }

    #[test]
    fn model_flag_is_appended() {
        // With `sh -c`, trailing arguments become $0, $1, ...
        let agent = shell_agent("cat >/dev/null; printf '%s %s' \"$0\" \"$1\"", Some("opus"));
        let out = agent.invoke("ignored", 1).expect("invoke");
        assert_eq!(out, "--model opus");
    }

    #[test]
    fn non_zero_exit_names_role() {
        let agent = shell_agent("cat >/dev/null; echo boom >&2; exit 2", None);
        let err = agent.invoke("p", 1).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("writer agent failed"));
        assert!(msg.contains("boom"));
    }
}
