//! CWA CLI - Command line tool for deriving cane/weather chart series.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "cwa-cli",
    version,
    about = "Sugarcane crushing and weather analytics toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: cwa_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    cwa_cmd::run(cli.command).await
}
