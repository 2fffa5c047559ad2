//! Category contribution engine.
//!
//! Per-variety recovery is not separately measured upstream; this engine
//! apportions each date's known total recovery across the three variety
//! groups in proportion to their crushed-quantity share, then corrects for
//! 2-decimal rounding drift so the split reconciles exactly with the
//! measured total.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use cwa_sources::raw::RawRecord;

use crate::round2;

/// The five fixed cane-age buckets, oldest first.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum AgeCategory {
    OverTwelve,
    TwelveMonths,
    ElevenMonths,
    TenMonths,
    UnderTen,
}

impl AgeCategory {
    pub const ALL: [AgeCategory; 5] = [
        AgeCategory::OverTwelve,
        AgeCategory::TwelveMonths,
        AgeCategory::ElevenMonths,
        AgeCategory::TenMonths,
        AgeCategory::UnderTen,
    ];

    /// The chart-facing label, matching the upstream bucket names.
    pub fn label(&self) -> &'static str {
        match self {
            AgeCategory::OverTwelve => ">12",
            AgeCategory::TwelveMonths => "12 month",
            AgeCategory::ElevenMonths => "11 months",
            AgeCategory::TenMonths => "10 months",
            AgeCategory::UnderTen => "<10 months",
        }
    }
}

impl Serialize for AgeCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// The three variety groups the quantity columns are bucketed under.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Variety {
    Hsv,
    Msv,
    Other,
}

impl Variety {
    pub const ALL: [Variety; 3] = [Variety::Hsv, Variety::Msv, Variety::Other];

    /// Canonical quantity field for a (variety, age) cell of the age
    /// breakdown source. Fixed, non-extensible lookup.
    pub fn quantity_field(self, age: AgeCategory) -> &'static str {
        const FIELDS: [[&str; 5]; 3] = [
            ["hsv_over_12", "hsv_12", "hsv_11", "hsv_10", "hsv_under_10"],
            ["msv_over_12", "msv_12", "msv_11", "msv_10", "msv_under_10"],
            [
                "other_over_12",
                "other_12",
                "other_11",
                "other_10",
                "other_under_10",
            ],
        ];
        FIELDS[self as usize][age as usize]
    }
}

/// One emitted (date, age category) row: per-variety quantity, share, and
/// reconciled recovery contribution, plus the date totals the split was
/// computed against. Field names serialize to what the age/variety chart
/// consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionRecord {
    pub date: String,
    #[serde(rename = "ageCategory")]
    pub age_category: AgeCategory,
    pub rainfall: f64,
    #[serde(rename = "HSV")]
    pub hsv_share_pct: f64,
    #[serde(rename = "HSVRecovery")]
    pub hsv_recovery: f64,
    #[serde(rename = "HSVQuantity")]
    pub hsv_quantity: f64,
    #[serde(rename = "MSV")]
    pub msv_share_pct: f64,
    #[serde(rename = "MSVRecovery")]
    pub msv_recovery: f64,
    #[serde(rename = "MSVQuantity")]
    pub msv_quantity: f64,
    #[serde(rename = "Other")]
    pub other_share_pct: f64,
    #[serde(rename = "OtherRecovery")]
    pub other_recovery: f64,
    #[serde(rename = "OtherQuantity")]
    pub other_quantity: f64,
    #[serde(rename = "totalRecovery")]
    pub total_recovery: f64,
    #[serde(rename = "totalQuantity")]
    pub total_quantity: f64,
}

struct DateBucket {
    total_recovery: f64,
    total_quantity: f64,
    /// quantities[variety][age]
    quantities: [[f64; 5]; 3],
}

/// Derive the per-(date, age) variety contribution series.
///
/// `recovery_by_date` is the high-confidence total-recovery lookup; a date
/// that is absent there, or carries 0, falls back to the age record's own
/// low-confidence `recovery` field, defaulting to 0. Dates whose variety
/// quantities sum to 0 are dropped entirely, and (date, age) pairs where
/// all three varieties are 0 are never emitted.
pub fn variety_contributions(
    age_records: &[RawRecord],
    recovery_by_date: &BTreeMap<String, f64>,
    rainfall_by_date: &BTreeMap<String, f64>,
) -> Vec<ContributionRecord> {
    // BTreeMap keeps the emitted dates in ascending key order.
    let mut by_date: BTreeMap<String, DateBucket> = BTreeMap::new();

    for record in age_records {
        let Some(date) = record.date_key("date") else {
            continue;
        };
        let bucket = by_date.entry(date.clone()).or_insert_with(|| {
            // Total recovery is fixed at the date's first record:
            // high-confidence series first, the record's own field as the
            // low-confidence fallback.
            let total_recovery = match recovery_by_date.get(&date) {
                Some(&v) if v != 0.0 => v,
                _ => record.num("recovery"),
            };
            DateBucket {
                total_recovery,
                total_quantity: 0.0,
                quantities: [[0.0; 5]; 3],
            }
        });
        for (v, variety) in Variety::ALL.iter().enumerate() {
            for (a, age) in AgeCategory::ALL.iter().enumerate() {
                let quantity = record.num(variety.quantity_field(*age));
                if quantity > 0.0 {
                    bucket.quantities[v][a] += quantity;
                    bucket.total_quantity += quantity;
                }
            }
        }
    }

    let mut results = Vec::new();

    for (date, bucket) in &by_date {
        if bucket.total_quantity == 0.0 {
            continue;
        }
        let rainfall = rainfall_by_date.get(date).copied().unwrap_or(0.0);

        for (a, age) in AgeCategory::ALL.iter().enumerate() {
            let quantities = [
                bucket.quantities[0][a],
                bucket.quantities[1][a],
                bucket.quantities[2][a],
            ];
            if quantities.iter().all(|&q| q == 0.0) {
                continue;
            }

            let contributions: Vec<f64> = quantities
                .iter()
                .map(|q| round2(q / bucket.total_quantity * bucket.total_recovery))
                .collect();
            // Rescale so the three contributions reconcile exactly with
            // the date's total recovery, closing the rounding gap. When
            // everything rounded to zero there is nothing to rescale.
            let sum: f64 = contributions.iter().sum();
            let factor = if sum != 0.0 {
                bucket.total_recovery / sum
            } else {
                1.0
            };
            let recoveries: Vec<f64> = contributions.iter().map(|c| round2(c * factor)).collect();
            let shares: Vec<f64> = quantities
                .iter()
                .map(|q| round2(q / bucket.total_quantity * 100.0))
                .collect();

            results.push(ContributionRecord {
                date: date.clone(),
                age_category: *age,
                rainfall,
                hsv_share_pct: shares[0],
                hsv_recovery: recoveries[0],
                hsv_quantity: round2(quantities[0]),
                msv_share_pct: shares[1],
                msv_recovery: recoveries[1],
                msv_quantity: round2(quantities[1]),
                other_share_pct: shares[2],
                other_recovery: recoveries[2],
                other_quantity: round2(quantities[2]),
                total_recovery: round2(bucket.total_recovery),
                total_quantity: bucket.total_quantity,
            });
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records(rows: Value) -> Vec<RawRecord> {
        rows.as_array()
            .unwrap()
            .iter()
            .map(|row| RawRecord(row.as_object().unwrap().clone()))
            .collect()
    }

    fn lookup(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_proportional_split_reconciles_exactly() {
        let input = records(json!([
            {
                "date": "2023-02-01 00:00:00",
                "hsv_over_12": 60,
                "msv_over_12": 30,
                "other_over_12": 10,
            }
        ]));
        let out = variety_contributions(
            &input,
            &lookup(&[("2023-02-01", 10.0)]),
            &BTreeMap::new(),
        );
        assert_eq!(out.len(), 1);
        let record = &out[0];
        assert_eq!(record.age_category, AgeCategory::OverTwelve);
        assert_eq!(record.hsv_share_pct, 60.0);
        assert_eq!(record.msv_share_pct, 30.0);
        assert_eq!(record.other_share_pct, 10.0);
        assert_eq!(record.hsv_recovery, 6.0);
        assert_eq!(record.msv_recovery, 3.0);
        assert_eq!(record.other_recovery, 1.0);
        assert_eq!(
            record.hsv_recovery + record.msv_recovery + record.other_recovery,
            record.total_recovery
        );
        assert_eq!(record.total_quantity, 100.0);
    }

    #[test]
    fn test_reconciliation_tolerance_on_uneven_split() {
        let input = records(json!([
            {
                "date": "2023-02-01",
                "hsv_over_12": 33.3,
                "msv_over_12": 33.3,
                "other_over_12": 33.4,
            }
        ]));
        let out = variety_contributions(
            &input,
            &lookup(&[("2023-02-01", 9.87)]),
            &BTreeMap::new(),
        );
        let record = &out[0];
        let sum = record.hsv_recovery + record.msv_recovery + record.other_recovery;
        assert!(
            (sum - record.total_recovery).abs() <= 0.02,
            "sum {} vs total {}",
            sum,
            record.total_recovery
        );
    }

    #[test]
    fn test_zero_quantity_date_dropped_entirely() {
        let input = records(json!([
            { "date": "2023-02-01", "recovery": 9.5 },
        ]));
        let out = variety_contributions(&input, &BTreeMap::new(), &BTreeMap::new());
        assert!(out.is_empty());
    }

    #[test]
    fn test_all_zero_age_pair_not_emitted() {
        let input = records(json!([
            { "date": "2023-02-01", "hsv_over_12": 50, "msv_12": 0, "other_11": "" },
        ]));
        let out = variety_contributions(
            &input,
            &lookup(&[("2023-02-01", 10.0)]),
            &BTreeMap::new(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].age_category, AgeCategory::OverTwelve);
    }

    #[test]
    fn test_recovery_source_preference() {
        let rows = json!([
            { "date": "2023-02-01", "recovery": 7.0, "hsv_over_12": 10 },
        ]);

        // High-confidence value wins.
        let out = variety_contributions(
            &records(rows.clone()),
            &lookup(&[("2023-02-01", 9.9)]),
            &BTreeMap::new(),
        );
        assert_eq!(out[0].total_recovery, 9.9);

        // A zero high-confidence entry falls back to the record field.
        let out = variety_contributions(
            &records(rows.clone()),
            &lookup(&[("2023-02-01", 0.0)]),
            &BTreeMap::new(),
        );
        assert_eq!(out[0].total_recovery, 7.0);

        // Neither present: defaults to 0 but the pair still emits.
        let rows = json!([
            { "date": "2023-02-01", "hsv_over_12": 10 },
        ]);
        let out = variety_contributions(&records(rows), &BTreeMap::new(), &BTreeMap::new());
        assert_eq!(out[0].total_recovery, 0.0);
        assert_eq!(out[0].hsv_recovery, 0.0);
        assert_eq!(out[0].hsv_share_pct, 100.0);
    }

    #[test]
    fn test_total_recovery_fixed_at_first_record_of_date() {
        let input = records(json!([
            { "date": "2023-02-01", "recovery": 5.0, "hsv_over_12": 10 },
            { "date": "2023-02-01", "recovery": 7.0, "msv_12": 20 },
        ]));
        let out = variety_contributions(&input, &BTreeMap::new(), &BTreeMap::new());
        assert!(out.iter().all(|r| r.total_recovery == 5.0));
        // Quantities from both records accumulate into the date totals.
        assert!(out.iter().all(|r| r.total_quantity == 30.0));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_rainfall_attached_per_date() {
        let input = records(json!([
            { "date": "2023-02-01", "hsv_over_12": 10 },
            { "date": "2023-02-02", "hsv_over_12": 10 },
        ]));
        let out = variety_contributions(
            &input,
            &lookup(&[("2023-02-01", 10.0), ("2023-02-02", 10.0)]),
            &lookup(&[("2023-02-01", 4.2)]),
        );
        assert_eq!(out[0].rainfall, 4.2);
        assert_eq!(out[1].rainfall, 0.0);
    }

    #[test]
    fn test_dates_emitted_in_ascending_order() {
        let input = records(json!([
            { "date": "2023-02-02", "hsv_over_12": 1 },
            { "date": "2023-01-15", "msv_11": 2 },
            { "date": "2023-02-01", "other_under_10": 3 },
        ]));
        let out = variety_contributions(&input, &BTreeMap::new(), &BTreeMap::new());
        let dates: Vec<&str> = out.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2023-01-15", "2023-02-01", "2023-02-02"]);
    }

    #[test]
    fn test_age_category_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&AgeCategory::UnderTen).unwrap(),
            "\"<10 months\""
        );
        assert_eq!(
            serde_json::to_string(&AgeCategory::OverTwelve).unwrap(),
            "\">12\""
        );
    }
}
