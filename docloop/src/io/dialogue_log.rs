//! Append-only dialogue log, one entry per round.
//!
//! This is the product record of a run and is written regardless of `RUST_LOG`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::tokens::RoundTokens;
use crate::core::types::{ReviewerOutput, WriterOutput};

/// Everything recorded for one round.
#[derive(Debug, Clone, Copy)]
pub struct DialogueEntry<'a> {
    pub iteration: u32,
    pub primary_path: &'a Path,
    pub writer: &'a WriterOutput,
    pub reviewer: &'a ReviewerOutput,
    pub tokens: RoundTokens,
    pub total_tokens: u64,
}

/// Append `entry` to the log at `path`, creating it (and parents) if needed.
pub fn append_entry(path: &Path, entry: &DialogueEntry<'_>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let rendered = render_entry(entry)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open dialogue log {}", path.display()))?;
    file.write_all(rendered.as_bytes())
        .with_context(|| format!("append dialogue log {}", path.display()))?;
    file.sync_all()
        .with_context(|| format!("sync dialogue log {}", path.display()))
}

fn render_entry(entry: &DialogueEntry<'_>) -> Result<String> {
    let mut buf = String::new();
    buf.push_str(&format!("## Iteration {}\n\n", entry.iteration));
    buf.push_str(&format!("main file: {}\n\n", entry.primary_path.display()));
    buf.push_str("### Writer\n\n");
    buf.push_str(&json_block(entry.writer)?);
    buf.push_str("### Reviewer\n\n");
    buf.push_str(&json_block(entry.reviewer)?);
    buf.push_str(&format!("feedback: {}\n", entry.reviewer.feedback()));
    buf.push_str(&format!("complete: {}\n", entry.reviewer.is_complete()));
    buf.push_str(&format!(
        "tokens: writer={} reviewer={} total={}\n\n",
        entry.tokens.writer.total(),
        entry.tokens.reviewer.total(),
        entry.total_tokens
    ));
    Ok(buf)
}

fn json_block<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string_pretty(value).context("serialize dialogue payload")?;
    Ok(format!("```json\n{json}\n```\n\n"))
}
