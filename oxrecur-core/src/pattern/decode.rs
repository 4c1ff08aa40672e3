//! Pattern string decoding.

use tracing::debug;

use super::{RecurrencePattern, RecurrenceType, SeriesEnd, Weekdays};
use crate::error::{CodecError, CodecResult};
use crate::tz::from_millis;

/// Raw numeric values keyed by the single-letter pattern keys.
#[derive(Default)]
struct RawFields {
    t: Option<i64>,
    i: Option<i64>,
    a: Option<i64>,
    b: Option<i64>,
    c: Option<i64>,
    s: Option<i64>,
    e: Option<i64>,
    o: Option<i64>,
}

/// Decode a pipe-delimited pattern string such as `t|1|i|1|s|1222865100000|`.
///
/// Unknown keys are skipped. Missing required keys, non-numeric values and
/// out-of-range values are reported as [`CodecError::MalformedPatternString`].
pub fn parse_pattern(input: &str) -> CodecResult<RecurrencePattern> {
    let raw = read_fields(input)?;

    let type_code = raw.t.ok_or_else(|| CodecError::malformed("missing type 't'"))?;
    let kind = match (type_code, raw.a.is_some()) {
        (0, _) => RecurrenceType::NoRecurrence,
        (1, _) => RecurrenceType::Daily,
        (2, _) => RecurrenceType::Weekly,
        (3, false) => RecurrenceType::MonthlyByDay,
        (3, true) => RecurrenceType::MonthlyByWeekday,
        (4, false) => RecurrenceType::YearlyByDay,
        (4, true) => RecurrenceType::YearlyByWeekday,
        (other, _) => {
            return Err(CodecError::malformed(format!("unknown type {other}")));
        }
    };

    if kind == RecurrenceType::NoRecurrence {
        let start = raw.s.map(millis).transpose()?;
        return Ok(RecurrencePattern {
            start,
            ..RecurrencePattern::no_recurrence()
        });
    }

    let interval = raw
        .i
        .ok_or_else(|| CodecError::malformed("missing interval 'i'"))?;
    let interval = u32::try_from(interval)
        .ok()
        .filter(|i| *i > 0)
        .ok_or_else(|| CodecError::malformed(format!("invalid interval {interval}")))?;

    let start = raw
        .s
        .ok_or_else(|| CodecError::malformed("missing start 's'"))
        .and_then(millis)?;

    let days = match raw.a {
        Some(bits) if kind.uses_days() => Weekdays::from_bits(bits)
            .filter(|days| !days.is_empty())
            .ok_or_else(|| CodecError::malformed(format!("invalid weekday mask {bits}")))?,
        _ => Weekdays::NONE,
    };

    let day_in_month = if kind.is_day_variant() || kind.is_weekday_variant() {
        let day = raw
            .b
            .ok_or_else(|| CodecError::malformed("missing day 'b'"))?;
        Some(u32::try_from(day).map_err(|_| CodecError::malformed(format!("invalid day {day}")))?)
    } else {
        None
    };

    // Months are persisted zero-based
    let month = if kind.is_yearly() {
        let month = raw
            .c
            .ok_or_else(|| CodecError::malformed("missing month 'c'"))?;
        match month {
            0..=11 => Some(month as u32 + 1),
            _ => return Err(CodecError::malformed(format!("invalid month {month}"))),
        }
    } else {
        None
    };

    let end = match (raw.o, raw.e) {
        (Some(count), until) => {
            if until.is_some() {
                debug!("pattern carries both count and end, keeping count");
            }
            let count = u32::try_from(count)
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| CodecError::malformed(format!("invalid count {count}")))?;
            Some(SeriesEnd::Count(count))
        }
        (None, Some(until)) => Some(SeriesEnd::Until(millis(until)?)),
        (None, None) => None,
    };

    let pattern = RecurrencePattern {
        kind,
        interval,
        days,
        day_in_month,
        month,
        start: Some(start),
        end,
    };
    pattern.validate()?;

    debug!(pattern = input, kind = ?pattern.kind, "decoded recurrence pattern");
    Ok(pattern)
}

fn read_fields(input: &str) -> CodecResult<RawFields> {
    let mut tokens: Vec<&str> = input.trim().split('|').collect();
    if tokens.last() == Some(&"") {
        tokens.pop();
    }

    if tokens.is_empty() {
        return Err(CodecError::malformed("empty pattern"));
    }
    if tokens.len() % 2 != 0 {
        return Err(CodecError::malformed(format!(
            "key '{}' has no value",
            tokens[tokens.len() - 1]
        )));
    }

    let mut raw = RawFields::default();
    for pair in tokens.chunks_exact(2) {
        let (key, value) = (pair[0].trim(), pair[1].trim());
        let slot = match key {
            "t" => &mut raw.t,
            "i" => &mut raw.i,
            "a" => &mut raw.a,
            "b" => &mut raw.b,
            "c" => &mut raw.c,
            "s" => &mut raw.s,
            "e" => &mut raw.e,
            "o" => &mut raw.o,
            _ => {
                debug!(key, "ignoring unknown pattern key");
                continue;
            }
        };
        let number = value.parse::<i64>().map_err(|_| {
            CodecError::malformed(format!("value of '{key}' is not a number: '{value}'"))
        })?;
        *slot = Some(number);
    }

    Ok(raw)
}

fn millis(ms: i64) -> CodecResult<chrono::DateTime<chrono::Utc>> {
    from_millis(ms).ok_or_else(|| CodecError::malformed(format!("timestamp out of range: {ms}")))
}
