//! RRULE parsing into a recurrence pattern.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use super::{SETPOS_LAST, UNTIL_FORMAT};
use crate::error::{CodecError, CodecResult};
use crate::pattern::{LAST_WEEK_POSITION, RecurrencePattern, RecurrenceType, SeriesEnd, Weekdays};
use crate::tz::{utc_to_wall_clock, wall_clock_to_utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Values collected from the `KEY=VALUE` tokens of one rule.
#[derive(Default)]
struct RuleFields {
    freq: Option<Frequency>,
    interval: Option<u32>,
    days: Weekdays,
    /// Week position taken from a `BYDAY` ordinal prefix such as `2FR`
    ordinal: Option<u32>,
    set_pos: Option<u32>,
    month_day: Option<u32>,
    month: Option<u32>,
    count: Option<u32>,
    until: Option<DateTime<Utc>>,
}

/// Parse an RRULE value into a pattern starting at `reference`.
///
/// The reference zone is also the zone used to read `UNTIL`; the stored
/// series end holds the wall-clock cutoff in that zone, matching what
/// [`super::generate_rrule`] expects.
pub fn parse_rrule(rrule: &str, reference: DateTime<Tz>) -> CodecResult<RecurrencePattern> {
    let tz = reference.timezone();
    let body = strip_prefix(rrule.trim());

    let mut fields = RuleFields::default();
    for token in body.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| CodecError::invalid_value(token, ""))?;
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        match key.as_str() {
            "FREQ" => fields.freq = Some(parse_frequency(value)?),
            "INTERVAL" => fields.interval = Some(positive(&key, value)?),
            "COUNT" => fields.count = Some(positive(&key, value)?),
            "BYMONTHDAY" => fields.month_day = Some(in_range(&key, value, 1, 31)?),
            "BYMONTH" => fields.month = Some(in_range(&key, value, 1, 12)?),
            "BYSETPOS" => fields.set_pos = Some(week_position(&key, value)?),
            "BYDAY" => parse_byday(value, &mut fields)?,
            "UNTIL" => fields.until = Some(parse_until(value, tz)?),
            "WKST" => {
                Weekdays::from_code(value).ok_or_else(|| CodecError::invalid_value(&key, value))?;
            }
            _ => return Err(CodecError::UnknownRRuleKey(key)),
        }
    }

    let freq = fields
        .freq
        .ok_or_else(|| CodecError::invalid_value("FREQ", ""))?;

    if fields.count.is_some() && fields.until.is_some() {
        return Err(CodecError::invalid_value("COUNT", "COUNT and UNTIL are exclusive"));
    }

    let kind = resolve_kind(freq, &fields)?;
    let position = match (fields.set_pos, fields.ordinal) {
        (Some(set_pos), Some(ordinal)) if set_pos != ordinal => {
            return Err(CodecError::invalid_value(
                "BYSETPOS",
                "conflicts with BYDAY ordinal",
            ));
        }
        (set_pos, ordinal) => set_pos.or(ordinal),
    };

    let day_in_month = if kind.is_weekday_variant() {
        Some(position.ok_or_else(|| CodecError::invalid_value("BYSETPOS", ""))?)
    } else if kind.is_day_variant() {
        Some(fields.month_day.unwrap_or_else(|| reference.day()))
    } else {
        None
    };

    let month = if kind.is_yearly() {
        Some(fields.month.unwrap_or_else(|| reference.month()))
    } else {
        None
    };

    let end = match (fields.count, fields.until) {
        (Some(count), _) => Some(SeriesEnd::Count(count)),
        (None, Some(until)) => {
            let cutoff = utc_to_wall_clock(until, tz)
                .ok_or_else(|| CodecError::invalid_value("UNTIL", &until.to_rfc3339()))?;
            Some(SeriesEnd::Until(cutoff))
        }
        (None, None) => None,
    };

    let pattern = RecurrencePattern {
        kind,
        interval: fields.interval.unwrap_or(1),
        days: if kind.uses_days() {
            fields.days
        } else {
            Weekdays::NONE
        },
        day_in_month,
        month,
        start: Some(reference.with_timezone(&Utc)),
        end,
    };
    pattern.validate()?;

    debug!(rrule = body, kind = ?pattern.kind, "parsed RRULE");
    Ok(pattern)
}

fn strip_prefix(rrule: &str) -> &str {
    match rrule.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &rrule[6..],
        _ => rrule,
    }
}

fn parse_frequency(value: &str) -> CodecResult<Frequency> {
    match value.to_ascii_uppercase().as_str() {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKLY" => Ok(Frequency::Weekly),
        "MONTHLY" => Ok(Frequency::Monthly),
        "YEARLY" => Ok(Frequency::Yearly),
        _ => Err(CodecError::UnsupportedFrequency(value.to_string())),
    }
}

/// Pick the pattern variant, rejecting BY* parts the pattern cannot hold.
fn resolve_kind(freq: Frequency, fields: &RuleFields) -> CodecResult<RecurrenceType> {
    let has_days = !fields.days.is_empty();
    let has_position = fields.set_pos.is_some() || fields.ordinal.is_some();

    let reject = |key: &str| Err(CodecError::invalid_value(key, "not supported for this frequency"));

    match freq {
        Frequency::Daily => {
            if has_days {
                return reject("BYDAY");
            }
            if has_position {
                return reject("BYSETPOS");
            }
            if fields.month_day.is_some() {
                return reject("BYMONTHDAY");
            }
            if fields.month.is_some() {
                return reject("BYMONTH");
            }
            Ok(RecurrenceType::Daily)
        }
        Frequency::Weekly => {
            if has_position {
                return reject("BYSETPOS");
            }
            if fields.month_day.is_some() {
                return reject("BYMONTHDAY");
            }
            if fields.month.is_some() {
                return reject("BYMONTH");
            }
            Ok(RecurrenceType::Weekly)
        }
        Frequency::Monthly | Frequency::Yearly => {
            if fields.month.is_some() && freq == Frequency::Monthly {
                return reject("BYMONTH");
            }
            if has_days && fields.month_day.is_some() {
                return reject("BYMONTHDAY");
            }
            if !has_days && has_position {
                return reject("BYSETPOS");
            }
            Ok(match (freq, has_days) {
                (Frequency::Monthly, true) => RecurrenceType::MonthlyByWeekday,
                (Frequency::Monthly, false) => RecurrenceType::MonthlyByDay,
                (_, true) => RecurrenceType::YearlyByWeekday,
                (_, false) => RecurrenceType::YearlyByDay,
            })
        }
    }
}

fn parse_number(key: &str, value: &str) -> CodecResult<i64> {
    value
        .trim_start_matches('+')
        .parse::<i64>()
        .map_err(|_| CodecError::InvalidNumericField {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn positive(key: &str, value: &str) -> CodecResult<u32> {
    in_range(key, value, 1, i64::from(u32::MAX))
}

fn in_range(key: &str, value: &str, min: i64, max: i64) -> CodecResult<u32> {
    let number = parse_number(key, value)?;
    if (min..=max).contains(&number) {
        Ok(number as u32)
    } else {
        Err(CodecError::invalid_value(key, value))
    }
}

/// Map an RFC 5545 set position onto the pattern's week position.
fn week_position(key: &str, value: &str) -> CodecResult<u32> {
    match parse_number(key, value)? {
        SETPOS_LAST => Ok(LAST_WEEK_POSITION),
        n @ 1..=5 => Ok(n as u32),
        _ => Err(CodecError::invalid_value(key, value)),
    }
}

fn parse_byday(value: &str, fields: &mut RuleFields) -> CodecResult<()> {
    for item in value.split(',').map(str::trim) {
        if !item.is_ascii() || item.len() < 2 {
            return Err(CodecError::invalid_value("BYDAY", item));
        }
        let (ordinal, code) = item.split_at(item.len() - 2);
        let day = Weekdays::from_code(code).ok_or_else(|| CodecError::invalid_value("BYDAY", item))?;
        fields.days |= day;

        if !ordinal.is_empty() {
            let position = week_position("BYDAY", ordinal)?;
            if fields.ordinal.is_some_and(|p| p != position) {
                return Err(CodecError::invalid_value("BYDAY", value));
            }
            fields.ordinal = Some(position);
        }
    }
    Ok(())
}

/// Parse `UNTIL` into a real UTC instant.
///
/// Floating values are read in `tz`; date-only values mean the end of that
/// date in `tz`.
fn parse_until(value: &str, tz: Tz) -> CodecResult<DateTime<Utc>> {
    let invalid = || CodecError::invalid_value("UNTIL", value);

    if value.ends_with(['Z', 'z']) {
        return NaiveDateTime::parse_from_str(&value.to_ascii_uppercase(), UNTIL_FORMAT)
            .map(|dt| dt.and_utc())
            .map_err(|_| invalid());
    }

    let local = if value.contains(['T', 't']) {
        NaiveDateTime::parse_from_str(&value.to_ascii_uppercase(), "%Y%m%dT%H%M%S")
            .map_err(|_| invalid())?
    } else {
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .ok_or_else(invalid)?
    };

    wall_clock_to_utc(local.and_utc(), tz).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe;

    fn reference() -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2008, 10, 1, 13, 5, 0).unwrap()
    }

    #[test]
    fn test_parse_daily() {
        let pattern = parse_rrule("FREQ=DAILY;INTERVAL=1", reference()).unwrap();

        assert_eq!(pattern.kind, RecurrenceType::Daily);
        assert_eq!(pattern.interval, 1);
        assert_eq!(pattern.start.unwrap().timestamp_millis(), 1222866300000);
        assert_eq!(pattern.end, None);
    }

    #[test]
    fn test_parse_is_order_independent_and_case_insensitive() {
        let a = parse_rrule("INTERVAL=2;byday=mo,we;FREQ=weekly", reference()).unwrap();
        let b = parse_rrule("RRULE:FREQ=WEEKLY;BYDAY=WE,MO;INTERVAL=2", reference()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.days, Weekdays::MONDAY | Weekdays::WEDNESDAY);
    }

    #[test]
    fn test_parse_interval_defaults_to_one() {
        let pattern = parse_rrule("FREQ=WEEKLY;BYDAY=FR", reference()).unwrap();
        assert_eq!(pattern.interval, 1);
    }

    #[test]
    fn test_parse_monthly_by_weekday_with_setpos() {
        let pattern = parse_rrule("FREQ=MONTHLY;BYSETPOS=2;BYDAY=FR", reference()).unwrap();
        assert_eq!(pattern.kind, RecurrenceType::MonthlyByWeekday);
        assert_eq!(pattern.days, Weekdays::FRIDAY);
        assert_eq!(pattern.day_in_month, Some(2));

        let last = parse_rrule("FREQ=MONTHLY;BYDAY=WE;BYSETPOS=-1", reference()).unwrap();
        assert_eq!(last.day_in_month, Some(LAST_WEEK_POSITION));
    }

    #[test]
    fn test_parse_byday_ordinal_prefix() {
        let pattern = parse_rrule("FREQ=MONTHLY;BYDAY=-1SU", reference()).unwrap();
        assert_eq!(pattern.kind, RecurrenceType::MonthlyByWeekday);
        assert_eq!(pattern.days, Weekdays::SUNDAY);
        assert_eq!(pattern.day_in_month, Some(LAST_WEEK_POSITION));

        let pattern = parse_rrule("FREQ=YEARLY;BYDAY=+3TH;BYMONTH=11", reference()).unwrap();
        assert_eq!(pattern.kind, RecurrenceType::YearlyByWeekday);
        assert_eq!(pattern.day_in_month, Some(3));
        assert_eq!(pattern.month, Some(11));
    }

    #[test]
    fn test_parse_fills_day_and_month_from_reference() {
        let monthly = parse_rrule("FREQ=MONTHLY", reference()).unwrap();
        assert_eq!(monthly.kind, RecurrenceType::MonthlyByDay);
        assert_eq!(monthly.day_in_month, Some(1));

        let yearly = parse_rrule("FREQ=YEARLY;BYMONTHDAY=24", reference()).unwrap();
        assert_eq!(yearly.kind, RecurrenceType::YearlyByDay);
        assert_eq!(yearly.month, Some(10));
    }

    #[test]
    fn test_parse_accepts_matching_setpos_and_ordinal() {
        let pattern = parse_rrule("FREQ=MONTHLY;BYDAY=2FR;BYSETPOS=2", reference()).unwrap();
        assert_eq!(pattern.day_in_month, Some(2));
    }

    #[test]
    fn test_parse_count() {
        let pattern = parse_rrule("FREQ=DAILY;COUNT=3", reference()).unwrap();
        assert_eq!(pattern.end, Some(SeriesEnd::Count(3)));
    }

    #[test]
    fn test_parse_until_converts_to_wall_clock() {
        let reference = Europe::Berlin.with_ymd_and_hms(2008, 10, 1, 15, 5, 0).unwrap();
        let pattern =
            parse_rrule("FREQ=DAILY;INTERVAL=1;UNTIL=20081030T230000Z", reference).unwrap();

        assert_eq!(
            pattern.end,
            Some(SeriesEnd::Until(
                Utc.with_ymd_and_hms(2008, 10, 31, 0, 0, 0).unwrap()
            ))
        );
    }

    #[test]
    fn test_parse_until_date_only_means_end_of_day() {
        let pattern = parse_rrule("FREQ=DAILY;UNTIL=20081031", reference()).unwrap();
        assert_eq!(
            pattern.end,
            Some(SeriesEnd::Until(
                Utc.with_ymd_and_hms(2008, 10, 31, 23, 59, 59).unwrap()
            ))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_key() {
        let err = parse_rrule("FREQ=DAILY;BYHOUR=9", reference()).unwrap_err();
        assert!(matches!(err, CodecError::UnknownRRuleKey(key) if key == "BYHOUR"));
    }

    #[test]
    fn test_parse_accepts_wkst() {
        assert!(parse_rrule("FREQ=WEEKLY;BYDAY=MO;WKST=SU", reference()).is_ok());
    }

    #[test]
    fn test_parse_rejects_unsupported_frequency() {
        let err = parse_rrule("FREQ=HOURLY;INTERVAL=1", reference()).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedFrequency(_)));
    }

    #[test]
    fn test_parse_rejects_non_numeric_fields() {
        for rrule in [
            "FREQ=DAILY;INTERVAL=x",
            "FREQ=DAILY;COUNT=three",
            "FREQ=MONTHLY;BYMONTHDAY=first",
            "FREQ=MONTHLY;BYDAY=FR;BYSETPOS=last",
            "FREQ=YEARLY;BYMONTH=NOV",
        ] {
            let err = parse_rrule(rrule, reference()).unwrap_err();
            assert!(
                matches!(err, CodecError::InvalidNumericField { .. }),
                "{rrule}: {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        for rrule in [
            "INTERVAL=1",
            "FREQ=DAILY;UNTIL=yesterday",
            "FREQ=DAILY;COUNT=3;UNTIL=20081031T000000Z",
            "FREQ=WEEKLY;BYDAY=XX",
            "FREQ=DAILY;BYDAY=MO",
            "FREQ=MONTHLY;BYDAY=MO",
            "FREQ=MONTHLY;BYMONTH=3",
            "FREQ=DAILY;INTERVAL=0",
            "FREQ=MONTHLY;BYMONTHDAY=32",
            "FREQ=DAILY;FOO",
            "FREQ=MONTHLY;BYDAY=FR;BYSETPOS=6",
            "FREQ=MONTHLY;BYDAY=FR;BYSETPOS=-2",
            "FREQ=MONTHLY;BYSETPOS=2",
            "FREQ=MONTHLY;BYDAY=2FR;BYSETPOS=3",
        ] {
            let err = parse_rrule(rrule, reference()).unwrap_err();
            assert!(
                matches!(err, CodecError::InvalidRRuleValue { .. }),
                "{rrule}: {err:?}"
            );
        }
    }
}
