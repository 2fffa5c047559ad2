//! Date-keyed aggregation of raw records.

use std::collections::BTreeMap;

use cwa_sources::raw::RawRecord;

/// How a field folds across records sharing a date key.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AggMode {
    /// Sum of the field across all records for the date.
    Sum,
    /// Mean over qualifying records only. A record qualifies when its gate
    /// field (the aggregated field itself when no gate is named) is
    /// present and > 0; zero qualifying records yields 0, never NaN.
    Mean { gate: Option<&'static str> },
}

/// One (source field, mode) pair to aggregate.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: &'static str,
    pub mode: AggMode,
}

impl FieldSpec {
    pub fn sum(field: &'static str) -> Self {
        FieldSpec {
            field,
            mode: AggMode::Sum,
        }
    }

    pub fn mean(field: &'static str) -> Self {
        FieldSpec {
            field,
            mode: AggMode::Mean { gate: None },
        }
    }
}

/// One aggregated row per distinct date key: the union of all aggregated
/// fields plus the date itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub date: String,
    pub values: BTreeMap<&'static str, f64>,
}

impl AggregateRecord {
    pub fn value(&self, field: &str) -> f64 {
        self.values.get(field).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, field: &'static str, value: f64) {
        self.values.insert(field, value);
    }
}

#[derive(Default, Clone, Copy)]
struct Acc {
    sum: f64,
    count: u32,
}

/// Group records by the date key derived from `date_field` and fold each
/// spec'd field per key. Records without a date key are skipped. Output is
/// one record per distinct key, sorted ascending by lexicographic string
/// order (the keys are ISO-like, so this is also calendar order).
pub fn aggregate_by_date(
    records: &[RawRecord],
    date_field: &str,
    specs: &[FieldSpec],
) -> Vec<AggregateRecord> {
    let mut by_date: BTreeMap<String, Vec<Acc>> = BTreeMap::new();

    for record in records {
        let Some(date) = record.date_key(date_field) else {
            continue;
        };
        let accs = by_date.entry(date).or_insert_with(|| vec![Acc::default(); specs.len()]);
        for (spec, acc) in specs.iter().zip(accs.iter_mut()) {
            match spec.mode {
                AggMode::Sum => acc.sum += record.num(spec.field),
                AggMode::Mean { gate } => {
                    if record.num(gate.unwrap_or(spec.field)) > 0.0 {
                        acc.sum += record.num(spec.field);
                        acc.count += 1;
                    }
                }
            }
        }
    }

    by_date
        .into_iter()
        .map(|(date, accs)| {
            let mut values = BTreeMap::new();
            for (spec, acc) in specs.iter().zip(accs) {
                let value = match spec.mode {
                    AggMode::Sum => acc.sum,
                    AggMode::Mean { .. } => {
                        if acc.count > 0 {
                            acc.sum / acc.count as f64
                        } else {
                            0.0
                        }
                    }
                };
                values.insert(spec.field, value);
            }
            AggregateRecord { date, values }
        })
        .collect()
}

/// Build a date-key -> scalar lookup from one dataset. Later records for
/// the same date overwrite earlier ones; records whose value field is
/// missing or unparsable are skipped.
pub fn scalar_by_date(
    records: &[RawRecord],
    date_field: &str,
    value_field: &str,
) -> BTreeMap<String, f64> {
    let mut lookup = BTreeMap::new();
    for record in records {
        let Some(date) = record.date_key(date_field) else {
            continue;
        };
        let Some(value) = record.opt_num(value_field) else {
            continue;
        };
        lookup.insert(date, value);
    }
    lookup
}
