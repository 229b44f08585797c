//! Locate and parse the structured JSON payload inside free-form model output.
//!
//! Models often wrap the payload in commentary, so the search is tolerant:
//! a ```json fenced block wins, otherwise the span from the first `{` to the
//! last `}` is tried. A fence only closes on a line that starts with ```, so
//! code fences escaped inside JSON strings never end the block early.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use super::types::Role;

/// Maximum characters of raw output quoted in extraction errors.
pub const EXCERPT_CHARS: usize = 400;

static JSON_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ims)```json[^\n]*\n(.*?)^[ \t]*```").expect("json fence regex")
});

/// No usable payload could be read from an agent's response.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("{role} response contained no JSON payload (raw output: {excerpt:?})")]
    NotFound { role: Role, excerpt: String },
    #[error("{role} response JSON payload is malformed: {source} (raw output: {excerpt:?})")]
    Malformed {
        role: Role,
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractionError {
    pub fn role(&self) -> Role {
        match self {
            ExtractionError::NotFound { role, .. } | ExtractionError::Malformed { role, .. } => {
                *role
            }
        }
    }
}

/// Return the candidate payload text, if any.
pub fn locate_payload(raw: &str) -> Option<&str> {
    if let Some(inner) = JSON_FENCE_RE.captures(raw).and_then(|caps| caps.get(1)) {
        return Some(inner.as_str());
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Locate and deserialize the payload of `role`'s response.
pub fn extract_payload<T: DeserializeOwned>(role: Role, raw: &str) -> Result<T, ExtractionError> {
    let Some(payload) = locate_payload(raw) else {
        return Err(ExtractionError::NotFound {
            role,
            excerpt: excerpt(raw),
        });
    };
    serde_json::from_str(payload.trim()).map_err(|source| ExtractionError::Malformed {
        role,
        excerpt: excerpt(raw),
        source,
    })
}

fn excerpt(raw: &str) -> String {
    raw.chars().take(EXCERPT_CHARS).collect()
}
