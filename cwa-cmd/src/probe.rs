//! Per-source diagnostics.

use log::info;

use cwa_sources::fetch::probe_sources;
use cwa_sources::source::Source;

/// Request each source once and log its status code and JSON validity.
/// Advisory only; always succeeds.
pub async fn run_probe(base_url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()?;
    info!("Probing {} sources at {}", Source::ALL.len(), base_url);
    probe_sources(&client, base_url).await;
    Ok(())
}

/// Print the raw source URLs, one per line, for direct inspection in a
/// browser or curl.
pub fn print_sources(base_url: &str) {
    for source in Source::ALL {
        println!("{}", source.url(base_url));
    }
}
