//! HTTP fetch client for the eight JSON sources.
//!
//! All sources are fetched concurrently and joined by an all-or-nothing
//! barrier: any non-200 status or parse failure aborts the whole load.
//! There are no retries; callers surface the error and may run
//! [`probe_sources`] for advisory diagnostics.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::raw::RawRecord;
use crate::source::{Snapshot, Source};

async fn fetch_source(client: &Client, base_url: &str, source: Source) -> Result<Vec<RawRecord>> {
    let url = source.url(base_url);
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("request failed for {}", url))?;
    let status = response.status();
    if !status.is_success() {
        bail!("failed to fetch {}: {}", source.file_name(), status);
    }
    let payload: Value = response
        .json()
        .await
        .with_context(|| format!("{} is not valid JSON", source.file_name()))?;
    let records = source.ingest(&payload)?;
    info!("{}: {} records", source.file_name(), records.len());
    Ok(records)
}

/// Fetch and ingest all eight sources into a [`Snapshot`].
pub async fn fetch_snapshot(client: &Client, base_url: &str) -> Result<Snapshot> {
    let (weather, cane, crush, varieties, temp_diff, temp_diff_cum, crush_recovery, age_breakdown) =
        tokio::try_join!(
            fetch_source(client, base_url, Source::Weather),
            fetch_source(client, base_url, Source::Cane),
            fetch_source(client, base_url, Source::Crush),
            fetch_source(client, base_url, Source::Varieties),
            fetch_source(client, base_url, Source::TempDiff),
            fetch_source(client, base_url, Source::TempDiffCum),
            fetch_source(client, base_url, Source::CrushRecovery),
            fetch_source(client, base_url, Source::AgeBreakdown),
        )?;
    Ok(Snapshot {
        weather,
        cane,
        crush,
        varieties,
        temp_diff,
        temp_diff_cum,
        crush_recovery,
        age_breakdown,
    })
}

/// Advisory diagnostics after a failed load: re-request each source and log
/// its status code and whether the body parses as JSON. Never fails and
/// never affects program state.
pub async fn probe_sources(client: &Client, base_url: &str) {
    for source in Source::ALL {
        let url = source.url(base_url);
        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("{}: request failed: {}", source.file_name(), err);
                continue;
            }
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!("{}: {} but body unreadable: {}", source.file_name(), status, err);
                continue;
            }
        };
        match serde_json::from_str::<Value>(&body) {
            Ok(_) => info!("{}: {} (valid JSON)", source.file_name(), status),
            Err(err) => {
                let head: String = body.chars().take(100).collect();
                warn!(
                    "{}: {} but not valid JSON: {} (body starts {:?})",
                    source.file_name(),
                    status,
                    err,
                    head
                );
            }
        }
    }
}
