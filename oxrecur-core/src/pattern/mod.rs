//! Recurrence patterns and the compact pipe-delimited pattern string.
//!
//! The pattern string is the persisted form of a recurrence rule, e.g.
//! `t|2|i|1|a|8|s|1222840800000|`. [`parse_pattern`] decodes it into a
//! [`RecurrencePattern`] and [`generate_pattern`] writes it back.

mod decode;
mod encode;
mod weekdays;

pub use decode::parse_pattern;
pub use encode::generate_pattern;
pub use weekdays::Weekdays;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Week position meaning "last" in the pattern string.
pub const LAST_WEEK_POSITION: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    NoRecurrence,
    Daily,
    Weekly,
    /// Monthly on a fixed day of the month
    MonthlyByDay,
    /// Monthly on the n-th weekday
    MonthlyByWeekday,
    /// Yearly on a fixed day of a month
    YearlyByDay,
    /// Yearly on the n-th weekday of a month
    YearlyByWeekday,
}

impl RecurrenceType {
    /// Type code used by the `t` key of the pattern string.
    pub fn type_code(self) -> i64 {
        match self {
            RecurrenceType::NoRecurrence => 0,
            RecurrenceType::Daily => 1,
            RecurrenceType::Weekly => 2,
            RecurrenceType::MonthlyByDay | RecurrenceType::MonthlyByWeekday => 3,
            RecurrenceType::YearlyByDay | RecurrenceType::YearlyByWeekday => 4,
        }
    }

    pub fn is_weekday_variant(self) -> bool {
        matches!(
            self,
            RecurrenceType::MonthlyByWeekday | RecurrenceType::YearlyByWeekday
        )
    }

    pub fn is_day_variant(self) -> bool {
        matches!(
            self,
            RecurrenceType::MonthlyByDay | RecurrenceType::YearlyByDay
        )
    }

    pub fn is_yearly(self) -> bool {
        matches!(
            self,
            RecurrenceType::YearlyByDay | RecurrenceType::YearlyByWeekday
        )
    }

    /// Whether the weekday bitmask is meaningful for this type.
    pub fn uses_days(self) -> bool {
        self == RecurrenceType::Weekly || self.is_weekday_variant()
    }
}

/// How a series ends. `None` on the pattern means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesEnd {
    /// Cutoff whose UTC fields hold the local wall-clock time of the last occurrence
    Until(DateTime<Utc>),
    /// Total number of occurrences
    Count(u32),
}

/// Decoded form of a pattern string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub kind: RecurrenceType,
    pub interval: u32,
    pub days: Weekdays,
    /// Day of month for the by-day variants, week position (1-5, 5 = last)
    /// for the by-weekday variants
    pub day_in_month: Option<u32>,
    /// Calendar month, 1-12
    pub month: Option<u32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<SeriesEnd>,
}

impl RecurrencePattern {
    /// A pattern repeating every period from `start`, open-ended.
    pub fn new(kind: RecurrenceType, start: DateTime<Utc>) -> Self {
        RecurrencePattern {
            kind,
            interval: 1,
            days: Weekdays::NONE,
            day_in_month: None,
            month: None,
            start: Some(start),
            end: None,
        }
    }

    pub fn no_recurrence() -> Self {
        RecurrencePattern {
            kind: RecurrenceType::NoRecurrence,
            interval: 1,
            days: Weekdays::NONE,
            day_in_month: None,
            month: None,
            start: None,
            end: None,
        }
    }

    pub fn interval(self, interval: u32) -> Self {
        RecurrencePattern { interval, ..self }
    }

    pub fn days(self, days: Weekdays) -> Self {
        RecurrencePattern { days, ..self }
    }

    pub fn day_in_month(self, day: u32) -> Self {
        RecurrencePattern {
            day_in_month: Some(day),
            ..self
        }
    }

    pub fn month(self, month: u32) -> Self {
        RecurrencePattern {
            month: Some(month),
            ..self
        }
    }

    pub fn until(self, until: DateTime<Utc>) -> Self {
        RecurrencePattern {
            end: Some(SeriesEnd::Until(until)),
            ..self
        }
    }

    pub fn count(self, count: u32) -> Self {
        RecurrencePattern {
            end: Some(SeriesEnd::Count(count)),
            ..self
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.kind != RecurrenceType::NoRecurrence
    }

    /// Check the invariants every recurring pattern must satisfy.
    pub fn validate(&self) -> CodecResult<()> {
        if !self.is_recurring() {
            return Ok(());
        }

        if self.start.is_none() {
            return Err(CodecError::malformed("missing start"));
        }
        if self.interval == 0 {
            return Err(CodecError::malformed("interval must be positive"));
        }
        if !self.days.is_valid() {
            return Err(CodecError::malformed(format!(
                "invalid weekday mask {}",
                self.days.bits()
            )));
        }

        if self.kind.is_weekday_variant() {
            if self.days.is_empty() {
                return Err(CodecError::malformed("weekday variant without weekdays"));
            }
            match self.day_in_month {
                Some(1..=LAST_WEEK_POSITION) => {}
                other => {
                    return Err(CodecError::malformed(format!(
                        "invalid week position {other:?}"
                    )));
                }
            }
        }

        if self.kind.is_day_variant() {
            match self.day_in_month {
                Some(1..=31) => {}
                other => {
                    return Err(CodecError::malformed(format!(
                        "invalid day of month {other:?}"
                    )));
                }
            }
        }

        if self.kind.is_yearly() {
            match self.month {
                Some(1..=12) => {}
                other => {
                    return Err(CodecError::malformed(format!("invalid month {other:?}")));
                }
            }
        }

        if self.end == Some(SeriesEnd::Count(0)) {
            return Err(CodecError::malformed("occurrence count must be positive"));
        }

        Ok(())
    }
}
