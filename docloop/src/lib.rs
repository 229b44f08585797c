//! Two-agent documentation loop.
//!
//! A writer agent drafts a document and a reviewer agent judges it, round after
//! round, until the reviewer accepts or an iteration cap is reached. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (payload extraction, templating,
//!   truncation, token estimates, loop state). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, file reads/writes, agent
//!   processes, dialogue log).
//!
//! [`agents`] builds the writer and reviewer steps from both, and [`looping`]
//! drives them.

pub mod agents;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
