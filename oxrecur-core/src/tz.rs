//! Timezone helpers for series end (UNTIL) handling.
//!
//! A series end is persisted as an epoch timestamp whose UTC fields carry the
//! local wall-clock cutoff, not the real UTC instant. These helpers convert
//! between that representation and true UTC instants for a given zone.

use chrono::{DateTime, LocalResult, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CodecError, CodecResult};

/// Parse an IANA timezone name such as `Europe/Berlin`.
pub fn parse_timezone(name: &str) -> CodecResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CodecError::InvalidTimezone(name.to_string()))
}

/// Read the UTC fields of `cutoff` as a wall-clock time in `tz` and return
/// the real UTC instant of that local time.
///
/// Ambiguous local times resolve to the earlier instant. Local times that
/// fall into a DST gap are moved forward by the length of the gap.
///
/// Returns `None` when the shifted instant falls outside chrono's range.
pub fn wall_clock_to_utc(cutoff: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = cutoff.naive_utc();
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            // Offset in force before the gap; no zone has two transitions within a day.
            let day_before = naive.checked_sub_signed(TimeDelta::hours(24))?;
            let before = tz.offset_from_utc_datetime(&day_before).fix().local_minus_utc();
            naive
                .checked_sub_signed(TimeDelta::seconds(i64::from(before)))
                .map(|utc| utc.and_utc())
        }
    }
}

/// Inverse of [`wall_clock_to_utc`]: express `instant` as wall-clock time in
/// `tz` and store those fields as UTC.
pub fn utc_to_wall_clock(instant: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let offset = tz
        .offset_from_utc_datetime(&instant.naive_utc())
        .fix()
        .local_minus_utc();
    instant
        .naive_utc()
        .checked_add_signed(TimeDelta::seconds(i64::from(offset)))
        .map(|local| local.and_utc())
}

/// Convert epoch milliseconds, rejecting values chrono cannot represent.
pub(crate) fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}
