//! Command implementations for the cane/weather analytics CLI.
//!
//! Provides subcommands for running the full fetch-and-derive pipeline
//! and for per-source diagnostics.

use clap::Subcommand;

use cwa_sources::source::BASE_URL;

pub mod derive;
pub mod probe;

#[derive(Subcommand)]
pub enum Command {
    /// Fetch all eight sources and write derived chart series as JSON
    Derive {
        /// Base URL hosting the JSON exports
        #[arg(long, default_value = BASE_URL)]
        base_url: String,

        /// Output directory for series JSON files
        #[arg(short = 'o', long, default_value = "series")]
        out_dir: String,
    },

    /// Check each source's HTTP status and JSON validity
    Probe {
        /// Base URL hosting the JSON exports
        #[arg(long, default_value = BASE_URL)]
        base_url: String,
    },

    /// Print the raw source URLs for direct inspection
    Sources {
        /// Base URL hosting the JSON exports
        #[arg(long, default_value = BASE_URL)]
        base_url: String,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Derive { base_url, out_dir } => derive::run_derive(&base_url, &out_dir).await,
        Command::Probe { base_url } => probe::run_probe(&base_url).await,
        Command::Sources { base_url } => {
            probe::print_sources(&base_url);
            Ok(())
        }
    }
}
