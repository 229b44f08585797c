//! Path resolution for persisted artifacts.
//!
//! Writer-supplied relative paths are reduced to their base name and placed
//! directly in the output directory, so they cannot escape it.

use std::path::{Path, PathBuf};

/// Resolve where the main artifact is written.
///
/// An absolute `requested` path is used as is; a relative one is placed in
/// `output_dir` by base name. Falls back to `default_path` when absent or unusable.
pub fn resolve_primary_path(
    output_dir: &Path,
    default_path: &Path,
    requested: Option<&str>,
) -> PathBuf {
    let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
        return default_path.to_path_buf();
    };
    let path = Path::new(requested);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    contained_path(output_dir, requested).unwrap_or_else(|| default_path.to_path_buf())
}

/// Resolve where a secondary artifact is written, or `None` if the path has no file name.
pub fn resolve_secondary_path(output_dir: &Path, requested: &str) -> Option<PathBuf> {
    contained_path(output_dir, requested.trim())
}

fn contained_path(output_dir: &Path, requested: &str) -> Option<PathBuf> {
    let name = Path::new(requested).file_name()?;
    Some(output_dir.join(name))
}
