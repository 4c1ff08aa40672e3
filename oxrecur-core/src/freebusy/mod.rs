//! Free-busy data and its iCalendar `VFREEBUSY` form.

mod generate;
mod parse;

pub use generate::generate_vfreebusy;
pub use parse::parse_vfreebusy;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC date-time format used by `VFREEBUSY` properties.
pub(crate) const ICS_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Free-busy time type (RFC 5545 `FBTYPE`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FreeBusyType {
    Free,
    #[default]
    Busy,
    BusyTentative,
    BusyUnavailable,
}

impl FreeBusyType {
    pub fn as_ics_str(self) -> &'static str {
        match self {
            FreeBusyType::Free => "FREE",
            FreeBusyType::Busy => "BUSY",
            FreeBusyType::BusyTentative => "BUSY-TENTATIVE",
            FreeBusyType::BusyUnavailable => "BUSY-UNAVAILABLE",
        }
    }

    /// Unrecognized values are treated as `BUSY`, as RFC 5545 requires.
    pub fn from_ics_str(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "FREE" => FreeBusyType::Free,
            "BUSY-TENTATIVE" => FreeBusyType::BusyTentative,
            "BUSY-UNAVAILABLE" => FreeBusyType::BusyUnavailable,
            _ => FreeBusyType::Busy,
        }
    }
}

/// One period of free or busy time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBusySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub fb_type: FreeBusyType,
}

/// The organizer or an attendee of a free-busy request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBusyAttendee {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

/// Free-busy information for one owner over a time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBusyData {
    pub uid: String,
    #[serde(default)]
    pub organizer: Option<FreeBusyAttendee>,
    #[serde(default)]
    pub attendees: Vec<FreeBusyAttendee>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Creation timestamp (DTSTAMP); the current time is used when absent
    #[serde(default)]
    pub dtstamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub slots: Vec<FreeBusySlot>,
}

/// Sort slots by start and coalesce overlapping or touching slots of the
/// same type.
pub fn merge_slots(slots: &[FreeBusySlot]) -> Vec<FreeBusySlot> {
    let mut sorted = slots.to_vec();
    sorted.sort_by_key(|s| (s.fb_type, s.start, s.end));

    let mut merged: Vec<FreeBusySlot> = Vec::with_capacity(sorted.len());
    for slot in sorted {
        match merged.last_mut() {
            Some(last) if last.fb_type == slot.fb_type && slot.start <= last.end => {
                last.end = last.end.max(slot.end);
            }
            _ => merged.push(slot),
        }
    }

    merged.sort_by_key(|s| (s.start, s.end));
    merged
}
