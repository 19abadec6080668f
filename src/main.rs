//! Streamlet - music library ingestion and cover reconciliation.
//!
//! Scans a directory tree for audio files, ingests their metadata into a
//! SQLite store, and guarantees every track ends up with a cover image
//! through a chain of fallbacks (embedded artwork, external lookup,
//! generated gradient placeholder).

pub mod cli;
pub mod config;
pub mod cover;
pub mod db;
pub mod error;
pub mod lookup;
pub mod model;
pub mod scanner;
pub mod tags;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("streamlet=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}
