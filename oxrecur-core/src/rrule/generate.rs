//! RRULE generation from a recurrence pattern.

use chrono_tz::Tz;
use tracing::debug;

use super::{SETPOS_LAST, UNTIL_FORMAT};
use crate::error::{CodecError, CodecResult};
use crate::pattern::{LAST_WEEK_POSITION, RecurrencePattern, RecurrenceType, SeriesEnd};
use crate::tz::wall_clock_to_utc;

/// Render a pattern as an RRULE value (without the `RRULE:` prefix).
///
/// Fields are emitted in the order `FREQ`, `BYDAY`, `BYSETPOS`,
/// `BYMONTHDAY`, `BYMONTH`, `INTERVAL`, then `COUNT` or `UNTIL`.
/// `tz` is the zone whose wall clock the stored series end refers to.
pub fn generate_rrule(pattern: &RecurrencePattern, tz: Tz) -> CodecResult<String> {
    pattern.validate()?;

    let freq = match pattern.kind {
        RecurrenceType::NoRecurrence => return Err(CodecError::NotRecurring),
        RecurrenceType::Daily => "DAILY",
        RecurrenceType::Weekly => "WEEKLY",
        RecurrenceType::MonthlyByDay | RecurrenceType::MonthlyByWeekday => "MONTHLY",
        RecurrenceType::YearlyByDay | RecurrenceType::YearlyByWeekday => "YEARLY",
    };

    let mut fields = vec![format!("FREQ={freq}")];

    if pattern.kind.uses_days() && !pattern.days.is_empty() {
        let codes: Vec<&str> = pattern.days.codes().collect();
        fields.push(format!("BYDAY={}", codes.join(",")));
    }

    if let Some(day) = pattern.day_in_month {
        if pattern.kind.is_weekday_variant() {
            let position = if day == LAST_WEEK_POSITION {
                SETPOS_LAST
            } else {
                i64::from(day)
            };
            fields.push(format!("BYSETPOS={position}"));
        } else if pattern.kind.is_day_variant() {
            fields.push(format!("BYMONTHDAY={day}"));
        }
    }

    if let Some(month) = pattern.month.filter(|_| pattern.kind.is_yearly()) {
        fields.push(format!("BYMONTH={month}"));
    }

    fields.push(format!("INTERVAL={}", pattern.interval));

    match pattern.end {
        Some(SeriesEnd::Count(count)) => fields.push(format!("COUNT={count}")),
        Some(SeriesEnd::Until(until)) => {
            let until = wall_clock_to_utc(until, tz).ok_or_else(|| {
                CodecError::malformed(format!("series end {until} out of range in {tz}"))
            })?;
            fields.push(format!("UNTIL={}", until.format(UNTIL_FORMAT)));
        }
        None => {}
    }

    let rrule = fields.join(";");
    debug!(rrule = %rrule, tz = %tz, "generated RRULE");
    Ok(rrule)
}
