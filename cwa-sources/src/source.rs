use anyhow::{bail, Context};
use serde_json::Value;

use crate::raw::RawRecord;
use crate::schema::{self, FieldMap};

/// Fixed base location hosting the pre-generated JSON exports.
pub const BASE_URL: &str = "https://aigokul.hysteresis.in";

/// The eight named JSON resources the dashboard derives from.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Source {
    Weather,
    Cane,
    Crush,
    Varieties,
    TempDiff,
    TempDiffCum,
    CrushRecovery,
    AgeBreakdown,
}

/// How a source's JSON body wraps its record array.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Shape {
    /// Plain top-level array.
    Array,
    /// Plain array whose last element is a totals sentinel to drop.
    ArrayWithSentinel,
    /// Array nested under a named top-level key.
    UnderKey(&'static str),
    /// Keyed object; the first key's value is the array.
    FirstKey,
}

impl Source {
    pub const ALL: [Source; 8] = [
        Source::Weather,
        Source::Cane,
        Source::Crush,
        Source::Varieties,
        Source::TempDiff,
        Source::TempDiffCum,
        Source::CrushRecovery,
        Source::AgeBreakdown,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Source::Weather => "weather_cleaned.json",
            Source::Cane => "cane_cleaned.json",
            Source::Crush => "sugcs.json",
            Source::Varieties => "sugcs2.json",
            Source::TempDiff => "tempdiff.json",
            Source::TempDiffCum => "tempdiff2.json",
            Source::CrushRecovery => "crushDateRecovery.json",
            Source::AgeBreakdown => "dateWithAge.json",
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.file_name())
    }

    fn shape(&self) -> Shape {
        match self {
            Source::Weather | Source::Cane => Shape::ArrayWithSentinel,
            Source::Crush => Shape::UnderKey("Sheet1"),
            Source::TempDiff => Shape::FirstKey,
            Source::TempDiffCum => Shape::UnderKey("Cum"),
            Source::Varieties | Source::CrushRecovery | Source::AgeBreakdown => Shape::Array,
        }
    }

    fn field_map(&self) -> FieldMap {
        match self {
            Source::Weather => schema::WEATHER_FIELDS,
            Source::Cane => schema::CANE_FIELDS,
            Source::Crush => schema::CRUSH_FIELDS,
            Source::Varieties => schema::VARIETY_FIELDS,
            Source::CrushRecovery => schema::CRUSH_RECOVERY_FIELDS,
            Source::AgeBreakdown => schema::AGE_BREAKDOWN_FIELDS,
            Source::TempDiff | Source::TempDiffCum => schema::NO_FIELDS,
        }
    }

    /// Unwrap the payload shape and translate each row into a canonical
    /// record. A payload that does not match the source's expected shape
    /// is a load failure, not a per-record default.
    pub fn ingest(&self, payload: &Value) -> anyhow::Result<Vec<RawRecord>> {
        let rows = match self.shape() {
            Shape::Array | Shape::ArrayWithSentinel => payload
                .as_array()
                .with_context(|| format!("{}: expected a top-level array", self.file_name()))?
                .as_slice(),
            Shape::UnderKey(key) => payload
                .get(key)
                .and_then(Value::as_array)
                .with_context(|| {
                    format!("{}: expected an array under key {:?}", self.file_name(), key)
                })?
                .as_slice(),
            Shape::FirstKey => {
                let object = payload.as_object().with_context(|| {
                    format!("{}: expected a keyed object", self.file_name())
                })?;
                object
                    .values()
                    .next()
                    .and_then(Value::as_array)
                    .with_context(|| {
                        format!("{}: expected an array under the first key", self.file_name())
                    })?
                    .as_slice()
            }
        };

        let rows = match self.shape() {
            // Drop the trailing totals sentinel row.
            Shape::ArrayWithSentinel => &rows[..rows.len().saturating_sub(1)],
            _ => rows,
        };

        let fields = self.field_map();
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(object) = row.as_object() else {
                bail!("{}: non-object row in record array", self.file_name());
            };
            let record = schema::translate(fields, object);
            // The age breakdown export pads with blank-date rows.
            if *self == Source::AgeBreakdown && record.date_key("date").is_none() {
                continue;
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// Immutable bundle of all eight ingested datasets.
///
/// Derivations read a snapshot and return freshly-built series; a reload
/// replaces the whole snapshot and everything is recomputed from scratch.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub weather: Vec<RawRecord>,
    pub cane: Vec<RawRecord>,
    pub crush: Vec<RawRecord>,
    pub varieties: Vec<RawRecord>,
    pub temp_diff: Vec<RawRecord>,
    pub temp_diff_cum: Vec<RawRecord>,
    pub crush_recovery: Vec<RawRecord>,
    pub age_breakdown: Vec<RawRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_row_dropped() {
        let payload = json!([
            { "Date": "2023-01-01", "Rain fall": "2.5" },
            { "Date": "2023-01-02", "Rain fall": "0" },
            { "Date": "", "Rain fall": "99.9" },
        ]);
        let records = Source::Weather.ingest(&payload).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].num("rainfall"), 0.0);
    }

    #[test]
    fn test_crush_unwraps_sheet1() {
        let payload = json!({
            "Sheet1": [
                { "Crushing Date": "2023-01-01", "Own Cane Crush": 100 },
            ]
        });
        let records = Source::Crush.ingest(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].num("own_cane"), 100.0);
    }

    #[test]
    fn test_crush_missing_key_is_error() {
        let payload = json!({ "Sheet2": [] });
        assert!(Source::Crush.ingest(&payload).is_err());
    }

    #[test]
    fn test_temp_diff_takes_first_key() {
        let payload = json!({ "Daily": [ { "x": 1 } ] });
        let records = Source::TempDiff.ingest(&payload).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_temp_diff_cum_unwraps_cum() {
        let payload = json!({ "Cum": [ {}, {} ] });
        let records = Source::TempDiffCum.ingest(&payload).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_age_breakdown_drops_blank_dates() {
        let payload = json!([
            { "Crushing Date": "2023-01-01 00:00:00", "Unnamed: 2": 5 },
            { "Crushing Date": "", "Unnamed: 2": 7 },
        ]);
        let records = Source::AgeBreakdown.ingest(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].num("hsv_12"), 5.0);
    }

    #[test]
    fn test_array_source_rejects_object_payload() {
        let payload = json!({ "rows": [] });
        assert!(Source::Varieties.ingest(&payload).is_err());
    }

    #[test]
    fn test_url() {
        assert_eq!(
            Source::Weather.url("https://example.test/"),
            "https://example.test/weather_cleaned.json"
        );
    }
}
