//! Tolerant file reads.
//!
//! Optional inputs (rules, context, previously written artifacts) collapse
//! "missing" and "unreadable" into empty content at this boundary, so the rest
//! of the loop never branches on those failures.

use std::fs;
use std::path::Path;

use tracing::debug;

/// Read a file as UTF-8, returning empty text when it cannot be read.
pub fn read_or_empty(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), err = %err, "unreadable file treated as empty");
            String::new()
        }
    }
}
