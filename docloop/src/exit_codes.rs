//! Stable exit codes for the `docloop` binary.

/// The loop finished: the reviewer accepted the document or the iteration cap was reached.
pub const OK: i32 = 0;
/// Missing or invalid configuration, agent failure, or unusable agent output.
pub const FAILED: i32 = 1;
