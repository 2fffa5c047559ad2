//! Whole-season summary totals feeding the pie charts.

use serde::Serialize;

use cwa_sources::raw::RawRecord;

/// One labeled slice of a summary pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: &'static str,
    pub value: f64,
    #[serde(rename = "fullName", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<&'static str>,
}

impl NamedValue {
    fn new(name: &'static str, value: f64) -> Self {
        NamedValue {
            name,
            value,
            full_name: None,
        }
    }
}

fn total(records: &[RawRecord], field: &str) -> f64 {
    records.iter().map(|record| record.num(field)).sum()
}

/// Season totals of own vs ratoon cane crush.
pub fn cane_type_totals(cane: &[RawRecord]) -> Vec<NamedValue> {
    vec![
        NamedValue::new("Own Cane", total(cane, "own_cane")),
        NamedValue::new("Ratoon Cane", total(cane, "ratoon_cane")),
    ]
}

/// Mean recovery per cane type, counting only records where that type's
/// crushed quantity is positive. Zero qualifying records reads 0.
pub fn average_recovery_by_type(cane: &[RawRecord]) -> Vec<NamedValue> {
    let gated_mean = |gate: &str| {
        let mut sum = 0.0;
        let mut count = 0u32;
        for record in cane {
            if record.num(gate) > 0.0 {
                sum += record.num("recovery");
                count += 1;
            }
        }
        if count > 0 {
            sum / count as f64
        } else {
            0.0
        }
    };
    vec![
        NamedValue::new("Own Cane", gated_mean("own_cane")),
        NamedValue::new("Ratoon Cane", gated_mean("ratoon_cane")),
    ]
}

/// Season totals of registered (own) vs unregistered cane crush.
pub fn registration_totals(crush: &[RawRecord]) -> Vec<NamedValue> {
    vec![
        NamedValue::new("Registered (Own Cane)", total(crush, "own_cane")),
        NamedValue::new("Unregistered", total(crush, "unregistered_cane")),
    ]
}

/// Season totals per sugar variety group, with expanded display names.
pub fn variety_totals(varieties: &[RawRecord]) -> Vec<NamedValue> {
    let slice = |name, field, full_name| NamedValue {
        name,
        value: total(varieties, field),
        full_name: Some(full_name),
    };
    vec![
        slice("HSV", "hsv", "High Sugar Variety"),
        slice("MSV", "msv", "Medium Sugar Variety"),
        slice("LSV", "other", "Low Sugar Variety"),
    ]
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

    #[test]
    fn test_cane_type_totals() {
        let cane = records(json!([
            { "own_cane": "100.5", "ratoon_cane": 20 },
            { "own_cane": 50, "ratoon_cane": "" },
        ]));
        let totals = cane_type_totals(&cane);
        assert_eq!(totals[0], NamedValue::new("Own Cane", 150.5));
        assert_eq!(totals[1], NamedValue::new("Ratoon Cane", 20.0));
    }

    #[test]
    fn test_average_recovery_gated_per_type() {
        let cane = records(json!([
            { "own_cane": 10, "ratoon_cane": 0, "recovery": 9.0 },
            { "own_cane": 0, "ratoon_cane": 5, "recovery": 11.0 },
            { "own_cane": 20, "ratoon_cane": 5, "recovery": 10.0 },
        ]));
        let averages = average_recovery_by_type(&cane);
        assert_eq!(averages[0].value, 9.5);
        assert_eq!(averages[1].value, 10.5);
    }

    #[test]
    fn test_average_recovery_empty_input_is_zero() {
        let averages = average_recovery_by_type(&[]);
        assert_eq!(averages[0].value, 0.0);
        assert_eq!(averages[1].value, 0.0);
    }

    #[test]
    fn test_variety_totals_carry_full_names() {
        let varieties = records(json!([
            { "hsv": 60, "msv": 30, "other": 10 },
            { "hsv": "40", "msv": "n/a" },
        ]));
        let totals = variety_totals(&varieties);
        assert_eq!(totals[0].value, 100.0);
        assert_eq!(totals[0].full_name, Some("High Sugar Variety"));
        assert_eq!(totals[1].value, 30.0);
        assert_eq!(totals[2].name, "LSV");
        assert_eq!(totals[2].full_name, Some("Low Sugar Variety"));
    }
}
