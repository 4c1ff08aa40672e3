//! Weekday bitmask shared by the pattern string and RRULE `BYDAY`.

use std::ops::{BitOr, BitOrAssign};

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Bit, RFC 5545 code and chrono weekday, in ascending bit order.
const DAY_TABLE: [(u8, &str, Weekday); 7] = [
    (1, "SU", Weekday::Sun),
    (2, "MO", Weekday::Mon),
    (4, "TU", Weekday::Tue),
    (8, "WE", Weekday::Wed),
    (16, "TH", Weekday::Thu),
    (32, "FR", Weekday::Fri),
    (64, "SA", Weekday::Sat),
];

/// A set of weekdays stored as the persisted bitmask (SU=1 ... SA=64).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weekdays(u8);

impl Weekdays {
    pub const NONE: Weekdays = Weekdays(0);
    pub const SUNDAY: Weekdays = Weekdays(1);
    pub const MONDAY: Weekdays = Weekdays(2);
    pub const TUESDAY: Weekdays = Weekdays(4);
    pub const WEDNESDAY: Weekdays = Weekdays(8);
    pub const THURSDAY: Weekdays = Weekdays(16);
    pub const FRIDAY: Weekdays = Weekdays(32);
    pub const SATURDAY: Weekdays = Weekdays(64);
    /// Monday to Friday
    pub const WEEKDAY: Weekdays = Weekdays(62);
    /// Saturday and Sunday
    pub const WEEKEND: Weekdays = Weekdays(65);
    pub const ALL: Weekdays = Weekdays(127);

    /// Build from a raw bitmask, rejecting bits outside the seven days.
    pub fn from_bits(bits: i64) -> Option<Self> {
        u8::try_from(bits)
            .ok()
            .filter(|b| b & !Self::ALL.0 == 0)
            .map(Weekdays)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the mask has bits outside the seven days.
    pub fn is_valid(self) -> bool {
        self.0 & !Self::ALL.0 == 0
    }

    pub fn contains(self, other: Weekdays) -> bool {
        self.0 & other.0 == other.0
    }

    /// Look up a two-letter RFC 5545 day code (`MO`, `tu`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        DAY_TABLE
            .iter()
            .find(|(_, c, _)| c.eq_ignore_ascii_case(code))
            .map(|(bit, _, _)| Weekdays(*bit))
    }

    pub fn from_weekday(day: Weekday) -> Self {
        DAY_TABLE
            .iter()
            .find(|(_, _, d)| *d == day)
            .map(|(bit, _, _)| Weekdays(*bit))
            .unwrap_or(Self::NONE)
    }

    /// Day codes contained in this set, lowest bit first.
    pub fn codes(self) -> impl Iterator<Item = &'static str> {
        DAY_TABLE
            .iter()
            .filter(move |(bit, _, _)| self.0 & bit != 0)
            .map(|(_, code, _)| *code)
    }
}

impl BitOr for Weekdays {
    type Output = Weekdays;

    fn bitor(self, rhs: Weekdays) -> Weekdays {
        Weekdays(self.0 | rhs.0)
    }
}

impl BitOrAssign for Weekdays {
    fn bitor_assign(&mut self, rhs: Weekdays) {
        self.0 |= rhs.0;
    }
}
