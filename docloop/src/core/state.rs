//! Loop-carried state threaded through rounds.

use std::path::PathBuf;

use super::tokens::RoundTokens;

/// The only mutable record shared between rounds.
///
/// Each round takes the state by value and returns the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationState {
    /// Number of the round about to run (1-indexed).
    pub iteration: u32,
    /// Reviewer feedback from the previous round (empty before round 1).
    pub feedback: String,
    /// Where the main artifact currently lives.
    pub primary_path: PathBuf,
    /// Secondary artifacts written by the most recent writer round.
    pub secondary_paths: Vec<PathBuf>,
    /// Running estimate of tokens spent so far.
    pub total_tokens: u64,
    pub complete: bool,
}

/// What a finished round contributes to the next state.
#[derive(Debug, Clone)]
pub struct RoundUpdate {
    pub primary_path: PathBuf,
    pub secondary_paths: Vec<PathBuf>,
    pub feedback: String,
    pub complete: bool,
    pub tokens: RoundTokens,
}

impl IterationState {
    pub fn new(primary_path: PathBuf) -> Self {
        Self {
            iteration: 1,
            feedback: String::new(),
            primary_path,
            secondary_paths: Vec::new(),
            total_tokens: 0,
            complete: false,
        }
    }

    /// Fold a finished round into the state and advance the iteration counter.
    pub fn advance(self, update: RoundUpdate) -> Self {
        Self {
            iteration: self.iteration + 1,
            feedback: update.feedback,
            primary_path: update.primary_path,
            secondary_paths: update.secondary_paths,
            total_tokens: self.total_tokens + update.tokens.total(),
            complete: update.complete,
        }
    }

    /// Rounds completed so far.
    pub fn rounds_completed(&self) -> u32 {
        self.iteration - 1
    }
}
