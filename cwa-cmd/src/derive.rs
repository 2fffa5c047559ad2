//! Full fetch-and-derive pipeline.

use std::path::Path;

use anyhow::Context;
use log::{info, warn};
use serde::Serialize;

use cwa_derive::dashboard::DashboardSeries;
use cwa_sources::fetch::{fetch_snapshot, probe_sources};
use cwa_sources::source::Source;

/// Fetch all sources, derive the full series bundle, and write one JSON
/// file per series into `out_dir`.
///
/// The load is all-or-nothing: any source failure aborts the derivation.
/// On failure an advisory per-source probe runs before the error is
/// returned, so the log carries enough to tell which source broke and how.
pub async fn run_derive(base_url: &str, out_dir: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()?;

    info!("Loading {} sources from {}", Source::ALL.len(), base_url);
    let snapshot = match fetch_snapshot(&client, base_url).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("Load failed: {:#}", err);
            probe_sources(&client, base_url).await;
            return Err(err);
        }
    };

    let series = DashboardSeries::derive(&snapshot);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir))?;
    write_series(out_dir, "cane_type_totals.json", &series.cane_type_totals)?;
    write_series(out_dir, "average_recovery.json", &series.average_recovery)?;
    write_series(out_dir, "registration_totals.json", &series.registration_totals)?;
    write_series(out_dir, "variety_totals.json", &series.variety_totals)?;
    write_series(out_dir, "recovery_over_time.json", &series.recovery_over_time)?;
    write_series(
        out_dir,
        "registration_over_time.json",
        &series.registration_over_time,
    )?;
    write_series(out_dir, "comprehensive_cane.json", &series.comprehensive_cane)?;
    write_series(
        out_dir,
        "cane_age_vs_recovery.json",
        &series.cane_age_vs_recovery,
    )?;
    write_series(
        out_dir,
        "rainfall_vs_recovery.json",
        &series.rainfall_vs_recovery,
    )?;
    write_series(
        out_dir,
        "temperature_vs_recovery.json",
        &series.temperature_vs_recovery,
    )?;

    info!("Derivation complete. Output: {}", out_dir);
    Ok(())
}

fn write_series<T: Serialize>(out_dir: &str, name: &str, series: &[T]) -> anyhow::Result<()> {
    let path = Path::new(out_dir).join(name);
    let body = serde_json::to_string_pretty(series)?;
    std::fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}
