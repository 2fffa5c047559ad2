//! Exact-date pairing of two independently indexed datasets.

use serde::Serialize;

use cwa_sources::raw::RawRecord;

use crate::aggregate::scalar_by_date;

/// An (x, y) sample for correlation-style views, tagged with the date the
/// two sources matched on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairPoint {
    pub x: f64,
    pub y: f64,
    pub date: String,
}

/// Pair two datasets on exact date-key equality: build a date lookup over
/// the x source, then emit one point per y record whose date exists in it.
/// No interpolation or nearest-date matching; an empty result is a valid
/// result (substituting placeholder data is the caller's policy, see
/// [`or_placeholder`]).
pub fn match_pairs(
    x_records: &[RawRecord],
    x_date_field: &str,
    x_value_field: &str,
    y_records: &[RawRecord],
    y_date_field: &str,
    y_value_field: &str,
) -> Vec<PairPoint> {
    let x_by_date = scalar_by_date(x_records, x_date_field, x_value_field);
    let mut points = Vec::new();
    for record in y_records {
        let Some(date) = record.date_key(y_date_field) else {
            continue;
        };
        let Some(y) = record.opt_num(y_value_field) else {
            continue;
        };
        if let Some(&x) = x_by_date.get(&date) {
            points.push(PairPoint { x, y, date });
        }
    }
    points
}

/// Placeholder-data policy: substitute a fixed illustrative sequence when
/// and only when the matcher produced nothing, so data-gap conditions still
/// render a populated chart.
pub fn or_placeholder(points: Vec<PairPoint>, placeholder: &[PairPoint]) -> Vec<PairPoint> {
    if points.is_empty() {
        placeholder.to_vec()
    } else {
        points
    }
}

fn point(x: f64, y: f64, date: &str) -> PairPoint {
    PairPoint {
        x,
        y,
        date: date.to_string(),
    }
}

/// Illustrative rainfall (x, mm) vs recovery (y, %) points.
pub fn rainfall_recovery_placeholder() -> Vec<PairPoint> {
    vec![
        point(5.0, 10.2, "2023-01-01"),
        point(10.0, 9.8, "2023-01-02"),
        point(15.0, 9.5, "2023-01-03"),
        point(2.0, 10.5, "2023-01-04"),
        point(8.0, 9.9, "2023-01-05"),
    ]
}

/// Illustrative max-temperature (x, C) vs recovery (y, %) points.
pub fn temperature_recovery_placeholder() -> Vec<PairPoint> {
    vec![
        point(32.0, 10.2, "2023-01-01"),
        point(33.0, 9.8, "2023-01-02"),
        point(35.0, 9.5, "2023-01-03"),
        point(30.0, 10.5, "2023-01-04"),
        point(31.0, 9.9, "2023-01-05"),
    ]
}
