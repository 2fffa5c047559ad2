use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single loosely-typed record, already translated to canonical field
/// names by a source adapter (see [`crate::schema`]).
///
/// Values stay as raw JSON: numbers, numeric-looking strings, date strings,
/// and empty strings all occur in the upstream exports. Accessors apply the
/// coercion policy from the derivation contracts: a missing, empty, or
/// unparsable numeric field reads as 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        RawRecord(Map::new())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Numeric coercion with the default-to-zero policy.
    pub fn num(&self, field: &str) -> f64 {
        self.opt_num(field).unwrap_or(0.0)
    }

    /// Numeric coercion that distinguishes "absent or unparsable" from an
    /// actual value. Used where the original data flow skips a record
    /// instead of defaulting.
    pub fn opt_num(&self, field: &str) -> Option<f64> {
        coerce_num(self.0.get(field)?)
    }

    /// The field's string form, if it is a string.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Canonical date key for this record: the date portion of the named
    /// field, with any time-of-day suffix stripped. Returns None when the
    /// field is missing or empty.
    pub fn date_key(&self, field: &str) -> Option<String> {
        let raw = self.text(field)?;
        let key = truncate_date(raw);
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }
}

/// Truncate a raw date string at the first `'T'` or space, covering both
/// combined date-time forms ("2023-02-01T00:00:00", "2023-02-01 00:00:00")
/// and plain dates. No calendar parsing: two records share a date iff the
/// truncated strings are equal.
pub fn truncate_date(raw: &str) -> &str {
    match raw.find(|c| c == 'T' || c == ' ') {
        Some(idx) => &raw[..idx],
        None => raw,
    }
}

/// Coerce a JSON value to f64. Numeric strings parse after trimming;
/// anything else is None.
pub fn coerce_num(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        let mut r = RawRecord::new();
        r.insert("field", value);
        r
    }

    #[test]
    fn test_num_coercion() {
        assert_eq!(record(json!(9.87)).num("field"), 9.87);
        assert_eq!(record(json!("9.87")).num("field"), 9.87);
        assert_eq!(record(json!(" 12 ")).num("field"), 12.0);
        assert_eq!(record(json!("")).num("field"), 0.0);
        assert_eq!(record(json!("n/a")).num("field"), 0.0);
        assert_eq!(record(json!(null)).num("field"), 0.0);
        assert_eq!(RawRecord::new().num("field"), 0.0);
    }

    #[test]
    fn test_opt_num_distinguishes_missing() {
        assert_eq!(record(json!("0")).opt_num("field"), Some(0.0));
        assert_eq!(record(json!("")).opt_num("field"), None);
        assert_eq!(RawRecord::new().opt_num("field"), None);
    }

    #[test]
    fn test_date_key_strips_time_suffix() {
        let mut r = RawRecord::new();
        r.insert("date", json!("2023-02-01T00:00:00"));
        assert_eq!(r.date_key("date").as_deref(), Some("2023-02-01"));

        r.insert("date", json!("2023-02-01 00:00:00"));
        assert_eq!(r.date_key("date").as_deref(), Some("2023-02-01"));

        r.insert("date", json!("2023-02-01"));
        assert_eq!(r.date_key("date").as_deref(), Some("2023-02-01"));
    }

    #[test]
    fn test_date_key_empty_is_none() {
        let mut r = RawRecord::new();
        r.insert("date", json!(""));
        assert_eq!(r.date_key("date"), None);
        assert_eq!(r.date_key("missing"), None);
    }
}
