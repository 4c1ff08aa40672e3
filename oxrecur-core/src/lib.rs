//! Recurrence and free-busy codecs for groupware calendars.
//!
//! - `pattern`: the compact pipe-delimited recurrence pattern string
//! - `rrule`: RFC 5545 RRULE generation and parsing for those patterns
//! - `freebusy`: free-busy data and its `VFREEBUSY` form
//!
//! All codecs are pure functions; nothing here keeps state between calls.

pub mod config;
pub mod error;
pub mod freebusy;
pub mod pattern;
pub mod rrule;
pub mod tz;

pub use error::{CodecError, CodecResult};
pub use pattern::{RecurrencePattern, RecurrenceType, SeriesEnd, Weekdays};
