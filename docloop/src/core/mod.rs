//! Deterministic, pure logic shared by the convergence loop.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod extract;
pub mod paths;
pub mod snapshot;
pub mod state;
pub mod template;
pub mod tokens;
pub mod truncate;
pub mod types;
