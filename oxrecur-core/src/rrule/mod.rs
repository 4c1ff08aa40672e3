//! RFC 5545 RRULE generation and parsing.
//!
//! Only the rule header is transcoded; occurrences are never enumerated.

mod generate;
mod parse;

pub use generate::generate_rrule;
pub use parse::parse_rrule;

/// `UNTIL` timestamp format (UTC form).
pub(crate) const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Value of `BYSETPOS` for the last week of a period.
pub(crate) const SETPOS_LAST: i64 = -1;
