use anyhow::{Context, Result};
use chrono_tz::Tz;
use oxrecur_core::pattern::generate_pattern;
use oxrecur_core::rrule::parse_rrule;

use crate::utils::parse_start;

pub fn run(rrule: &str, start: &str, tz: Tz, json: bool) -> Result<()> {
    let reference = parse_start(start, tz)?;
    let pattern = parse_rrule(rrule, reference).with_context(|| format!("Invalid RRULE '{rrule}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pattern)?);
    } else {
        println!("{}", generate_pattern(&pattern)?);
    }
    Ok(())
}
