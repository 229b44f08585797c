//! Persisting the main and additional artifacts.
//!
//! Writes are synchronous and synced to disk before returning, so the reviewer
//! (and the next round) always read what the writer just produced.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::io::read::read_or_empty;

/// Create parent directories as needed and overwrite `path` with `contents`.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    file.sync_all()
        .with_context(|| format!("sync {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "artifact written");
    Ok(())
}

/// Read back artifacts, pairing each path with its (possibly empty) content.
pub fn read_artifacts(paths: &[PathBuf]) -> Vec<(PathBuf, String)> {
    paths
        .iter()
        .map(|path| (path.clone(), read_or_empty(path)))
        .collect()
}
