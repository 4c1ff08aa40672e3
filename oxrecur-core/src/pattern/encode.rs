//! Pattern string encoding.

use super::{RecurrencePattern, SeriesEnd};
use crate::error::CodecResult;

/// Write a pattern back to its pipe-delimited string form.
///
/// Keys are written in the order `t i a b c s e o`, each pair followed by
/// `|`, which is the canonical form [`super::parse_pattern`] accepts.
pub fn generate_pattern(pattern: &RecurrencePattern) -> CodecResult<String> {
    pattern.validate()?;

    let mut out = String::new();
    let mut push = |key: &str, value: i64| {
        out.push_str(key);
        out.push('|');
        out.push_str(&value.to_string());
        out.push('|');
    };

    push("t", pattern.kind.type_code());

    if pattern.is_recurring() {
        push("i", i64::from(pattern.interval));

        if pattern.kind.uses_days() && !pattern.days.is_empty() {
            push("a", i64::from(pattern.days.bits()));
        }
        if let Some(day) = pattern.day_in_month {
            push("b", i64::from(day));
        }
        // Months are persisted zero-based
        if let Some(month) = pattern.month {
            push("c", i64::from(month) - 1);
        }
    }

    if let Some(start) = pattern.start {
        push("s", start.timestamp_millis());
    }

    match pattern.end {
        Some(SeriesEnd::Until(until)) => push("e", until.timestamp_millis()),
        Some(SeriesEnd::Count(count)) => push("o", i64::from(count)),
        None => {}
    }

    Ok(out)
}
