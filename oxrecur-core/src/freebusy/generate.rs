//! VFREEBUSY generation.
//!
//! The icalendar builder has no free-busy component, so content lines are
//! written directly and folded per RFC 5545.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{FreeBusyAttendee, FreeBusyData, ICS_UTC_FORMAT};
use crate::error::{CodecError, CodecResult};

const PRODID: &str = "-//oxrecur//freebusy//EN";

/// Maximum content line length in octets before folding.
const FOLD_WIDTH: usize = 75;

/// Generate a `VCALENDAR` holding a single `VFREEBUSY` component.
pub fn generate_vfreebusy(data: &FreeBusyData) -> CodecResult<String> {
    if data.uid.trim().is_empty() {
        return Err(CodecError::FreeBusyGenerate("missing UID".into()));
    }
    if data.end <= data.start {
        return Err(CodecError::FreeBusyGenerate(format!(
            "range ends before it starts: {} - {}",
            data.start, data.end
        )));
    }

    let mut slots = data.slots.clone();
    slots.sort_by_key(|s| (s.start, s.end));
    if let Some(bad) = slots.iter().find(|s| s.end <= s.start) {
        return Err(CodecError::FreeBusyGenerate(format!(
            "slot ends before it starts: {} - {}",
            bad.start, bad.end
        )));
    }

    let dtstamp = data.dtstamp.unwrap_or_else(Utc::now);

    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODID}"));
    push_line(&mut out, "BEGIN:VFREEBUSY");
    push_line(&mut out, &format!("UID:{}", escape_text(&data.uid)));
    push_line(&mut out, &format!("DTSTAMP:{}", utc(dtstamp)));
    push_line(&mut out, &format!("DTSTART:{}", utc(data.start)));
    push_line(&mut out, &format!("DTEND:{}", utc(data.end)));

    if let Some(ref organizer) = data.organizer {
        push_line(&mut out, &address_line("ORGANIZER", organizer));
    }
    for attendee in &data.attendees {
        push_line(&mut out, &address_line("ATTENDEE", attendee));
    }

    for slot in &slots {
        push_line(
            &mut out,
            &format!(
                "FREEBUSY;FBTYPE={}:{}/{}",
                slot.fb_type.as_ics_str(),
                utc(slot.start),
                utc(slot.end)
            ),
        );
    }

    push_line(&mut out, "END:VFREEBUSY");
    push_line(&mut out, "END:VCALENDAR");

    debug!(uid = %data.uid, slots = slots.len(), "generated VFREEBUSY");
    Ok(out)
}

fn utc(dt: DateTime<Utc>) -> String {
    dt.format(ICS_UTC_FORMAT).to_string()
}

/// ORGANIZER/ATTENDEE line with an optional CN parameter
fn address_line(name: &str, address: &FreeBusyAttendee) -> String {
    match address.name {
        Some(ref cn) => format!(
            "{name};CN={}:mailto:{}",
            param_value(cn),
            address.email
        ),
        None => format!("{name}:mailto:{}", address.email),
    }
}

/// Quote parameter values containing separators; DQUOTE itself is not allowed.
fn param_value(value: &str) -> String {
    let value = value.replace('"', "");
    if value.contains([':', ';', ',']) {
        format!("\"{value}\"")
    } else {
        value
    }
}

fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Append a content line, folding at 75 octets without splitting characters.
fn push_line(out: &mut String, line: &str) {
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > FOLD_WIDTH {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += len;
    }
    out.push_str("\r\n");
}
