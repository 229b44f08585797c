//! Run configuration, loaded once per invocation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::task::TaskDescription;

/// Configuration path used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "docloop.toml";

/// File name of the main artifact inside the output directory.
pub const DEFAULT_MAIN_FILE: &str = "index.md";

const DIALOGUE_LOG_FILE: &str = "dialogue_log.md";

/// When token estimates are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenReport {
    /// After every round and once at the end.
    EachRound,
    /// Only in the final summary.
    End,
}

/// Run configuration (TOML, or JSON when the file extension is `.json`).
///
/// Missing fields default to values suitable for a local run; only `topic`
/// must be provided.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunConfig {
    /// Subject of the document being produced.
    pub topic: String,

    /// Directory that receives the main and additional files.
    pub output_dir: PathBuf,

    /// Task description file (first line: target directory, rest: task text).
    pub task_file: Option<PathBuf>,

    /// Whether the writer may emit additional files next to the main one.
    pub allow_additional_files: bool,

    /// Maximum number of writer/reviewer rounds.
    pub max_iterations: u32,

    /// Append-only dialogue log; defaults to `<output_dir>/dialogue_log.md`.
    pub dialogue_log: Option<PathBuf>,

    /// Writer prompt template; the embedded default is used when unset.
    pub writer_prompt: Option<PathBuf>,

    /// Reviewer prompt template; the embedded default is used when unset.
    pub reviewer_prompt: Option<PathBuf>,

    pub context_files: Vec<PathBuf>,
    pub context_dirs: Vec<PathBuf>,
    pub writer_rules: Vec<PathBuf>,
    pub reviewer_rules: Vec<PathBuf>,

    /// Character limit for each piece of auxiliary context and reviewed content.
    pub context_limit: Option<usize>,

    /// Character limit for the state snapshot handed to the writer.
    pub state_limit: Option<usize>,

    pub token_report: TokenReport,

    /// Output-token ceiling passed to every model invocation.
    pub max_output_tokens: u32,

    pub writer_model: Option<String>,
    pub reviewer_model: Option<String>,

    pub agent: AgentCommandConfig,
}

/// How a model is invoked: an external command reading the prompt on stdin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentCommandConfig {
    /// Program and arguments (e.g. `["claude", "-p"]`).
    pub command: Vec<String>,

    /// Flag preceding the model id when a role has one configured.
    pub model_flag: String,

    /// Environment variable that receives the output-token ceiling.
    pub max_tokens_env: Option<String>,

    /// Wall-clock limit for one invocation.
    pub timeout_secs: u64,

    /// Stdout beyond this many bytes is discarded.
    pub output_limit_bytes: usize,
}

impl Default for AgentCommandConfig {
    fn default() -> Self {
        Self {
            command: vec!["claude".to_string(), "-p".to_string()],
            model_flag: "--model".to_string(),
            max_tokens_env: Some("CLAUDE_CODE_MAX_OUTPUT_TOKENS".to_string()),
            timeout_secs: 30 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            topic: String::new(),
            output_dir: PathBuf::from("docs"),
            task_file: None,
            allow_additional_files: true,
            max_iterations: 5,
            dialogue_log: None,
            writer_prompt: None,
            reviewer_prompt: None,
            context_files: Vec::new(),
            context_dirs: Vec::new(),
            writer_rules: Vec::new(),
            reviewer_rules: Vec::new(),
            context_limit: Some(20_000),
            state_limit: Some(40_000),
            token_report: TokenReport::EachRound,
            max_output_tokens: 8_192,
            writer_model: None,
            reviewer_model: None,
            agent: AgentCommandConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(anyhow!("topic must be a non-empty string"));
        }
        if self.max_iterations == 0 {
            return Err(anyhow!("max_iterations must be >= 1"));
        }
        if self.max_output_tokens == 0 {
            return Err(anyhow!("max_output_tokens must be >= 1"));
        }
        if self.context_limit == Some(0) {
            return Err(anyhow!("context_limit must be > 0"));
        }
        if self.state_limit == Some(0) {
            return Err(anyhow!("state_limit must be > 0"));
        }
        if self.agent.command.is_empty() || self.agent.command[0].trim().is_empty() {
            return Err(anyhow!("agent.command must be a non-empty array"));
        }
        if self.agent.timeout_secs == 0 {
            return Err(anyhow!("agent.timeout_secs must be > 0"));
        }
        if self.agent.output_limit_bytes == 0 {
            return Err(anyhow!("agent.output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    /// Default location of the main artifact.
    pub fn default_primary_path(&self) -> PathBuf {
        self.output_dir.join(DEFAULT_MAIN_FILE)
    }

    pub fn dialogue_log_path(&self) -> PathBuf {
        self.dialogue_log
            .clone()
            .unwrap_or_else(|| self.output_dir.join(DIALOGUE_LOG_FILE))
    }

    /// Point the run at the task's target directory, when it names one.
    pub fn apply_task(&mut self, task: &TaskDescription) {
        if let Some(dir) = &task.directory {
            self.output_dir = dir.clone();
        }
    }
}

/// Load and validate config. A missing or malformed file is an error.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunConfig = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
    } else {
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
    };
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_config(&temp.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("docloop.toml");
        fs::write(&path, "topic = \"rate limiting\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.topic, "rate limiting");
        assert_eq!(cfg.max_iterations, 5);
        assert_eq!(cfg.token_report, TokenReport::EachRound);
        assert_eq!(cfg.default_primary_path(), PathBuf::from("docs/index.md"));
        assert_eq!(cfg.dialogue_log_path(), PathBuf::from("docs/dialogue_log.md"));
    }

    #[test]
    fn full_toml_parses_nested_agent_table() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("docloop.toml");
        fs::write(
            &path,
            r#"
topic = "caching"
output_dir = "out"
max_iterations = 2
allow_additional_files = false
context_dirs = ["src"]
writer_rules = ["rules/writer.md"]
context_limit = 500
token_report = "end"
writer_model = "opus"

[agent]
command = ["llm", "run"]
timeout_secs = 60
"#,
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.max_iterations, 2);
        assert!(!cfg.allow_additional_files);
        assert_eq!(cfg.context_dirs, vec![PathBuf::from("src")]);
        assert_eq!(cfg.context_limit, Some(500));
        assert_eq!(cfg.token_report, TokenReport::End);
        assert_eq!(cfg.writer_model.as_deref(), Some("opus"));
        assert_eq!(cfg.reviewer_model, None);
        assert_eq!(cfg.agent.command, vec!["llm", "run"]);
        assert_eq!(cfg.agent.model_flag, "--model");
        assert_eq!(cfg.agent.timeout_secs, 60);
    }

    #[test]
    fn json_config_is_supported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"topic":"queues","max_iterations":3}"#).expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.topic, "queues");
        assert_eq!(cfg.max_iterations, 3);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("docloop.toml");
        fs::write(&path, "topic = [").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn validate_rejects_zero_iterations_and_limits() {
        let base = RunConfig {
            topic: "t".to_string(),
            ..RunConfig::default()
        };
        assert!(base.validate().is_ok());

        let zero_iter = RunConfig {
            max_iterations: 0,
            ..base.clone()
        };
        assert!(zero_iter.validate().unwrap_err().to_string().contains("max_iterations"));

        let zero_limit = RunConfig {
            state_limit: Some(0),
            ..base.clone()
        };
        assert!(zero_limit.validate().unwrap_err().to_string().contains("state_limit"));

        let no_topic = RunConfig::default();
        assert!(no_topic.validate().unwrap_err().to_string().contains("topic"));
    }

    #[test]
    fn task_directory_overrides_output_dir() {
        let mut cfg = RunConfig::default();
        cfg.apply_task(&TaskDescription {
            directory: Some(PathBuf::from("/work/guides")),
            text: "write".to_string(),
        });
        assert_eq!(cfg.output_dir, PathBuf::from("/work/guides"));
        assert_eq!(cfg.default_primary_path(), PathBuf::from("/work/guides/index.md"));

        cfg.apply_task(&TaskDescription::default());
        assert_eq!(cfg.output_dir, PathBuf::from("/work/guides"));
    }
}
