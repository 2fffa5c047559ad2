//! Pure data-derivation layer for the cane/weather dashboard.
//!
//! Every function in this crate is a synchronous transformation of an
//! immutable dataset snapshot into freshly-built, chart-ready records.
//! No I/O, no caching, no incremental state: a reload recomputes
//! everything from scratch.

pub mod aggregate;
pub mod contribution;
pub mod dashboard;
pub mod join;
pub mod scatter;
pub mod summaries;

/// Round to 2 decimals, the precision all derived percentages and
/// contributions are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
