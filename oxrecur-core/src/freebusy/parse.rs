//! VFREEBUSY parsing using the icalendar crate's parser.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};
use tracing::debug;

use super::{FreeBusyAttendee, FreeBusyData, FreeBusySlot, FreeBusyType, ICS_UTC_FORMAT};
use crate::error::{CodecError, CodecResult};
use crate::tz::wall_clock_to_utc;

/// Parse ICS content holding a `VFREEBUSY` component.
pub fn parse_vfreebusy(content: &str) -> CodecResult<FreeBusyData> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| CodecError::FreeBusyParse(e.to_string()))?;
    let vfreebusy = calendar
        .components
        .iter()
        .find(|c| c.name == "VFREEBUSY")
        .ok_or_else(|| CodecError::FreeBusyParse("no VFREEBUSY component".into()))?;

    let uid = vfreebusy
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .ok_or_else(|| CodecError::FreeBusyParse("missing UID".into()))?;
    let start = required_time(vfreebusy, "DTSTART")?;
    let end = required_time(vfreebusy, "DTEND")?;
    let dtstamp = vfreebusy
        .find_prop("DTSTAMP")
        .map(to_utc)
        .transpose()?;

    let organizer = vfreebusy.find_prop("ORGANIZER").map(parse_address);
    let attendees: Vec<FreeBusyAttendee> = vfreebusy
        .properties
        .iter()
        .filter(|p| p.name == "ATTENDEE")
        .map(parse_address)
        .collect();

    let mut slots = Vec::new();
    for prop in vfreebusy.properties.iter().filter(|p| p.name == "FREEBUSY") {
        slots.extend(parse_freebusy_property(prop)?);
    }

    debug!(uid = %uid, slots = slots.len(), "parsed VFREEBUSY");
    Ok(FreeBusyData {
        uid,
        organizer,
        attendees,
        start,
        end,
        dtstamp,
        slots,
    })
}

fn required_time(component: &Component, name: &str) -> CodecResult<DateTime<Utc>> {
    let prop = component
        .find_prop(name)
        .ok_or_else(|| CodecError::FreeBusyParse(format!("missing {name}")))?;
    to_utc(prop)
}

/// Convert a date or date-time property to UTC; dates mean midnight UTC.
fn to_utc(prop: &Property) -> CodecResult<DateTime<Utc>> {
    let dpt = DatePerhapsTime::try_from(prop).map_err(|_| {
        CodecError::FreeBusyParse(format!("invalid {}: '{}'", prop.name, prop.val))
    })?;

    Ok(match dpt {
        DatePerhapsTime::Date(d) => d.and_time(chrono::NaiveTime::MIN).and_utc(),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => dt,
            CalendarDateTime::Floating(naive) => naive.and_utc(),
            CalendarDateTime::WithTimezone { date_time, tzid } => {
                let tz = tzid
                    .parse::<Tz>()
                    .map_err(|_| CodecError::FreeBusyParse(format!("unknown TZID '{tzid}'")))?;
                wall_clock_to_utc(date_time.and_utc(), tz).ok_or_else(|| {
                    CodecError::FreeBusyParse(format!("{} out of range in {tzid}", prop.name))
                })?
            }
        },
    })
}

/// Parse one FREEBUSY property, which may hold several comma-separated
/// periods of the form `start/end` or `start/duration`.
fn parse_freebusy_property(prop: &Property) -> CodecResult<Vec<FreeBusySlot>> {
    let fb_type = prop
        .params
        .iter()
        .find(|p| p.key == "FBTYPE")
        .and_then(|p| p.val.as_ref())
        .map(|v| FreeBusyType::from_ics_str(v.as_ref()))
        .unwrap_or_default();

    prop.val
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|period| {
            let (start, end) = parse_period(period)?;
            Ok(FreeBusySlot {
                start,
                end,
                fb_type,
            })
        })
        .collect()
}

fn parse_period(period: &str) -> CodecResult<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid = || CodecError::FreeBusyParse(format!("invalid period '{period}'"));

    let (start, rest) = period.split_once('/').ok_or_else(invalid)?;
    let start = parse_utc(start).ok_or_else(invalid)?;

    let end = if rest.starts_with(['P', '+']) {
        let duration = iso8601::duration(rest.trim_start_matches('+')).map_err(|_| invalid())?;
        let std_duration: std::time::Duration = duration.into();
        start + TimeDelta::from_std(std_duration).map_err(|_| invalid())?
    } else {
        parse_utc(rest).ok_or_else(invalid)?
    };

    if end <= start {
        return Err(invalid());
    }
    Ok((start, end))
}

fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, ICS_UTC_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Parse ATTENDEE/ORGANIZER property
fn parse_address(prop: &Property) -> FreeBusyAttendee {
    let val: &str = prop.val.as_ref();
    let email = match val.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => &val[7..],
        _ => val,
    }
    .to_string();

    let name = prop
        .params
        .iter()
        .find(|p| p.key == "CN")
        .and_then(|p| p.val.as_ref())
        .map(|v| {
            let v: &str = v.as_ref();
            v.trim_matches('"').to_string()
        });

    FreeBusyAttendee { name, email }
}
