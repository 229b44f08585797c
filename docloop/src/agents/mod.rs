//! The two fixed agent roles: writer and reviewer.
//!
//! Each step assembles its prompt from static run inputs plus round state,
//! invokes its [`Agent`](crate::io::agent::Agent) and returns the parsed result.

pub mod reviewer;
pub mod writer;
