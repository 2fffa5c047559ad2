//! Snapshot-to-series composition.
//!
//! The thin state-holding shell owns a [`Snapshot`] of the loaded
//! datasets; everything here is a stateless recomputation of the full
//! series bundle from that snapshot.

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

pub use cwa_sources::source::Snapshot;

use crate::aggregate::{aggregate_by_date, scalar_by_date, FieldSpec};
use crate::contribution::{variety_contributions, ContributionRecord};
use crate::join::attach_by_date;
use crate::scatter::{
    match_pairs, or_placeholder, rainfall_recovery_placeholder,
    temperature_recovery_placeholder, PairPoint,
};
use crate::summaries::{
    average_recovery_by_type, cane_type_totals, registration_totals, variety_totals, NamedValue,
};

/// Per-date mean recovery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryPoint {
    pub date: String,
    pub recovery: f64,
}

/// Per-date registered vs unregistered crush totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationPoint {
    pub date: String,
    pub registered: f64,
    pub unregistered: f64,
    pub total: f64,
}

/// Per-date crush breakdown with the high-confidence recovery attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComprehensivePoint {
    pub date: String,
    #[serde(rename = "ownCane")]
    pub own_cane: f64,
    #[serde(rename = "unregisteredCane")]
    pub unregistered_cane: f64,
    #[serde(rename = "divInFromSemmedu")]
    pub div_in: f64,
    #[serde(rename = "totalCane")]
    pub total_cane: f64,
    pub recovery: f64,
}

/// Matched max-temperature / recovery sample, date-ordered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempRecoveryPoint {
    pub date: String,
    pub temperature: f64,
    pub recovery: f64,
}

/// The full derived series bundle the renderer consumes.
#[derive(Debug, Clone, Default)]
pub struct DashboardSeries {
    pub cane_type_totals: Vec<NamedValue>,
    pub average_recovery: Vec<NamedValue>,
    pub registration_totals: Vec<NamedValue>,
    pub variety_totals: Vec<NamedValue>,
    pub recovery_over_time: Vec<RecoveryPoint>,
    pub registration_over_time: Vec<RegistrationPoint>,
    pub comprehensive_cane: Vec<ComprehensivePoint>,
    pub cane_age_vs_recovery: Vec<ContributionRecord>,
    pub rainfall_vs_recovery: Vec<PairPoint>,
    pub temperature_vs_recovery: Vec<TempRecoveryPoint>,
}

impl DashboardSeries {
    /// Recompute every series from scratch.
    pub fn derive(snapshot: &Snapshot) -> Self {
        let series = DashboardSeries {
            cane_type_totals: cane_type_totals(&snapshot.cane),
            average_recovery: average_recovery_by_type(&snapshot.cane),
            registration_totals: registration_totals(&snapshot.crush),
            variety_totals: variety_totals(&snapshot.varieties),
            recovery_over_time: recovery_over_time(snapshot),
            registration_over_time: registration_over_time(snapshot),
            comprehensive_cane: comprehensive_cane(snapshot),
            cane_age_vs_recovery: cane_age_vs_recovery(snapshot),
            rainfall_vs_recovery: rainfall_vs_recovery(snapshot),
            temperature_vs_recovery: temperature_vs_recovery(snapshot),
        };
        info!(
            "derived series: {} recovery dates, {} contribution rows, {} rainfall pairs",
            series.recovery_over_time.len(),
            series.cane_age_vs_recovery.len(),
            series.rainfall_vs_recovery.len(),
        );
        series
    }
}

fn recovery_over_time(snapshot: &Snapshot) -> Vec<RecoveryPoint> {
    aggregate_by_date(
        &snapshot.cane,
        "crushing_date",
        &[FieldSpec::mean("recovery")],
    )
    .into_iter()
    .map(|record| RecoveryPoint {
        recovery: record.value("recovery"),
        date: record.date,
    })
    .collect()
}

fn registration_over_time(snapshot: &Snapshot) -> Vec<RegistrationPoint> {
    aggregate_by_date(
        &snapshot.crush,
        "date",
        &[
            FieldSpec::sum("own_cane"),
            FieldSpec::sum("unregistered_cane"),
            FieldSpec::sum("total_cane"),
        ],
    )
    .into_iter()
    .map(|record| RegistrationPoint {
        registered: record.value("own_cane"),
        unregistered: record.value("unregistered_cane"),
        total: record.value("total_cane"),
        date: record.date,
    })
    .collect()
}

fn comprehensive_cane(snapshot: &Snapshot) -> Vec<ComprehensivePoint> {
    let mut aggregates = aggregate_by_date(
        &snapshot.crush,
        "date",
        &[
            FieldSpec::sum("own_cane"),
            FieldSpec::sum("unregistered_cane"),
            FieldSpec::sum("div_in"),
            FieldSpec::sum("total_cane"),
        ],
    );
    attach_by_date(
        &mut aggregates,
        &snapshot.crush_recovery,
        "date",
        "recovery",
        "recovery",
    );
    aggregates
        .into_iter()
        .map(|record| ComprehensivePoint {
            own_cane: record.value("own_cane"),
            unregistered_cane: record.value("unregistered_cane"),
            div_in: record.value("div_in"),
            total_cane: record.value("total_cane"),
            recovery: record.value("recovery"),
            date: record.date,
        })
        .collect()
}

fn cane_age_vs_recovery(snapshot: &Snapshot) -> Vec<ContributionRecord> {
    let recovery_by_date = scalar_by_date(&snapshot.crush_recovery, "date", "recovery");
    let rainfall_by_date = scalar_by_date(&snapshot.weather, "date", "rainfall");
    variety_contributions(&snapshot.age_breakdown, &recovery_by_date, &rainfall_by_date)
}

fn rainfall_vs_recovery(snapshot: &Snapshot) -> Vec<PairPoint> {
    let matched = match_pairs(
        &snapshot.weather,
        "date",
        "rainfall",
        &snapshot.cane,
        "date",
        "recovery",
    );
    or_placeholder(matched, &rainfall_recovery_placeholder())
}

fn temperature_vs_recovery(snapshot: &Snapshot) -> Vec<TempRecoveryPoint> {
    let matched = match_pairs(
        &snapshot.weather,
        "date",
        "max_temp",
        &snapshot.cane,
        "date",
        "recovery",
    );
    let mut points: Vec<TempRecoveryPoint> =
        or_placeholder(matched, &temperature_recovery_placeholder())
            .into_iter()
            .map(|pair| TempRecoveryPoint {
                temperature: pair.x,
                recovery: pair.y,
                date: pair.date,
            })
            .collect();
    // Calendar-aware ordering; unparsable keys fall back to string order.
    points.sort_by(|a, b| {
        let parsed_a = NaiveDate::parse_from_str(&a.date, "%Y-%m-%d").ok();
        let parsed_b = NaiveDate::parse_from_str(&b.date, "%Y-%m-%d").ok();
        match (parsed_a, parsed_b) {
            (Some(date_a), Some(date_b)) => date_a.cmp(&date_b),
            _ => a.date.cmp(&b.date),
        }
    });
    points
}
