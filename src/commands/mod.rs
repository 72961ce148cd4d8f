//! Command implementations
//!
//! Commands are `impl Repository` blocks, organized into two categories:
//!
//! - `plumbing`: Low-level commands for direct object and index access
//! - `porcelain`: User-facing commands (init, add, commit)
//!
//! Commands print to the repository writer and report failures through
//! `anyhow`, wrapping the typed errors of the core.

pub mod plumbing;
pub mod porcelain;
