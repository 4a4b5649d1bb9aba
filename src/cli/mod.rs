//! Command-line interface for spin-match.
//!
//! This module provides CLI commands for resolving spins to videos,
//! inspecting the query plan, and reading the match cache.

mod commands;

pub use commands::{Cli, Commands, run_command};
