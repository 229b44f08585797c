//! Task description file: first line is the target directory, the rest is the task.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::io::read::read_or_empty;

/// Parsed task file. Immutable for the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDescription {
    /// Target output directory, resolved against the working directory.
    pub directory: Option<PathBuf>,
    pub text: String,
}

/// Parse task file contents, resolving a relative directory against `cwd`.
pub fn parse_task(contents: &str, cwd: &Path) -> TaskDescription {
    let (first, rest) = contents.split_once('\n').unwrap_or((contents, ""));
    let dir = first.trim();
    let directory = (!dir.is_empty()).then(|| {
        let path = Path::new(dir);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        }
    });
    TaskDescription {
        directory,
        text: rest.trim().to_string(),
    }
}

/// Read and parse the task file.
///
/// A missing or unreadable file reads as empty: no directory override and no
/// task text.
pub fn load_task(path: &Path) -> Result<TaskDescription> {
    let contents = read_or_empty(path);
    if contents.trim().is_empty() {
        warn!(path = %path.display(), "task file empty or unreadable; running without a task");
        return Ok(TaskDescription::default());
    }
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let task = parse_task(&contents, &cwd);
    debug!(
        path = %path.display(),
        directory = ?task.directory,
        task_chars = task.text.chars().count(),
        "task loaded"
    );
    Ok(task)
}
