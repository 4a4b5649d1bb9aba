//! Spin Match - resolves radio spins to their official music videos.
//!
//! Given an artist and song title as announced on air, this tool searches
//! the YouTube Data API with a ladder of query variants, scores the noisy
//! titles that come back, and caches the decision (found or not) so each
//! track is only ever searched once.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod matching;
pub mod model;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging (to stderr so stdout stays clean for --json)
    let filter = EnvFilter::builder()
        .with_default_directive("spin_match=info".parse()?)
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args)
}
