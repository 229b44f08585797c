//! I/O helpers for the convergence loop.

pub mod agent;
pub mod artifacts;
pub mod config;
pub mod context;
pub mod dialogue_log;
pub mod process;
pub mod prompt;
pub mod read;
pub mod task;
