//! Cross-source join of a secondary value series onto date-keyed
//! aggregates.

use cwa_sources::raw::{truncate_date, RawRecord};

use crate::aggregate::AggregateRecord;

/// Attach `secondary_value_field` onto every primary record whose date key
/// contains the secondary record's truncated date string.
///
/// Containment rather than equality is deliberate: the sources disagree on
/// zero padding and time-of-day suffixes, and once both sides are
/// normalized the containment collapses to equality in practice. All
/// containing primaries are updated; unmatched primaries keep the default
/// of 0. Secondary rows with a missing or unparsable value are skipped and
/// never overwrite an earlier match.
///
/// O(N x M) over the two inputs, which is fine at the few hundred rows the
/// exports carry.
pub fn attach_by_date(
    primary: &mut [AggregateRecord],
    secondary: &[RawRecord],
    secondary_date_field: &str,
    secondary_value_field: &str,
    out_field: &'static str,
) {
    for record in primary.iter_mut() {
        record.set(out_field, 0.0);
    }
    for row in secondary {
        let Some(raw_date) = row.text(secondary_date_field) else {
            continue;
        };
        let date = truncate_date(raw_date);
        if date.is_empty() {
            continue;
        }
        let Some(value) = row.opt_num(secondary_value_field) else {
            continue;
        };
        for record in primary.iter_mut() {
            if record.date.contains(date) {
                record.set(out_field, value);
            }
        }
    }
}
