//! Per-source schema mapping tables.
//!
//! The upstream JSON exports address columns by exact spreadsheet headers,
//! including misspellings, trailing whitespace, and positional
//! `Unnamed: N` placeholders for unlabeled columns. Each source gets one
//! explicit (raw header, canonical name) table, applied once at ingestion;
//! everything downstream only sees canonical names.

use serde_json::{Map, Value};

use crate::raw::RawRecord;

/// Raw header to canonical field name, one table per source.
pub type FieldMap = &'static [(&'static str, &'static str)];

/// `weather_cleaned.json`
pub const WEATHER_FIELDS: FieldMap = &[
    ("Date", "date"),
    ("Rain fall", "rainfall"),
    ("Max", "max_temp"),
    ("Min", "min_temp"),
];

/// `cane_cleaned.json`
pub const CANE_FIELDS: FieldMap = &[
    ("Date", "date"),
    ("Crushing Date", "crushing_date"),
    ("Recovery %", "recovery"),
    ("Crop Type Wise - Own Cane crush", "own_cane"),
    ("Ratoon Cane - Ratoon Cane", "ratoon_cane"),
];

/// `sugcs.json` (under the `Sheet1` key)
pub const CRUSH_FIELDS: FieldMap = &[
    ("Crushing Date", "date"),
    ("Own Cane Crush", "own_cane"),
    ("Unregistered Cane crush", "unregistered_cane"),
    ("Div IN from Semmedu", "div_in"),
    ("Total Cane Crush", "total_cane"),
];

/// `sugcs2.json` season variety totals. The MSV header really does carry a
/// trailing space in the export.
pub const VARIETY_FIELDS: FieldMap = &[
    ("OWN Cane - HSV Varieties (Co 86032, SI 309, Co 11015)", "hsv"),
    ("MSV Varieties (Co 0212 and 2003 V 46) ", "msv"),
    ("All Other Varieties", "other"),
];

/// `crushDateRecovery.json` — the high-confidence recovery series. The date
/// field keeps its raw form (" 00:00:00" suffix included); truncation is
/// the consumer's concern.
pub const CRUSH_RECOVERY_FIELDS: FieldMap = &[
    ("Crushing Date", "date"),
    ("Recovery %", "recovery"),
];

/// `dateWithAge.json` — per-date variety quantities bucketed by cane age.
///
/// The export lays the three variety groups out as repeated five-column
/// blocks; only the first column of each block is labeled, the rest are
/// positional. Canonical names follow the `<variety>_<age>` convention
/// consumed by the contribution engine.
pub const AGE_BREAKDOWN_FIELDS: FieldMap = &[
    ("Crushing Date", "date"),
    ("Recovery Percentage", "recovery"),
    // HSV block
    ("OWN Cane - HSV Varieties (Co 86032, SI 309, Co 11015)", "hsv_over_12"),
    ("Unnamed: 2", "hsv_12"),
    ("Unnamed: 3", "hsv_11"),
    ("Unnamed: 4", "hsv_10"),
    ("Unnamed: 5", "hsv_under_10"),
    // MSV block
    ("MSV Varieties (Co 0212 and 2003 V 46) ", "msv_over_12"),
    ("Unnamed: 8", "msv_12"),
    ("Unnamed: 9", "msv_11"),
    ("Unnamed: 10", "msv_10"),
    ("Unnamed: 11", "msv_under_10"),
    // Other block
    ("All Other Varieties", "other_over_12"),
    ("Unnamed: 14", "other_12"),
    ("Unnamed: 15", "other_11"),
    ("Unnamed: 16", "other_10"),
    ("Unnamed: 17", "other_under_10"),
];

/// Sources ingested for load-barrier parity only; no fields survive
/// translation.
pub const NO_FIELDS: FieldMap = &[];

/// Translate one raw JSON object into a canonical record. Unmapped raw
/// fields are dropped.
pub fn translate(fields: FieldMap, object: &Map<String, Value>) -> RawRecord {
    let mut record = RawRecord::new();
    for (raw, canonical) in fields {
        if let Some(value) = object.get(*raw) {
            record.insert(*canonical, value.clone());
        }
    }
    record
}
