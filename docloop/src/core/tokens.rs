//! Token cost estimates for observability.
//!
//! Estimates are informational only; nothing here truncates or blocks a call.

use serde::Serialize;

/// Estimate the token cost of a text block: character count / 4, rounded up.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

/// Estimated cost of a single model invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallTokens {
    pub prompt: u64,
    pub response: u64,
}

impl CallTokens {
    pub fn estimate(prompt: &str, response: &str) -> Self {
        Self {
            prompt: estimate_tokens(prompt),
            response: estimate_tokens(response),
        }
    }

    pub fn total(&self) -> u64 {
        self.prompt + self.response
    }
}

/// Estimated cost of one writer + reviewer round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundTokens {
    pub writer: CallTokens,
    pub reviewer: CallTokens,
}

impl RoundTokens {
    pub fn total(&self) -> u64 {
        self.writer.total() + self.reviewer.total()
    }
}
