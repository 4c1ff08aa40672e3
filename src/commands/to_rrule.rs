use anyhow::{Context, Result};
use chrono_tz::Tz;
use oxrecur_core::pattern::parse_pattern;
use oxrecur_core::rrule::generate_rrule;

pub fn run(pattern: &str, tz: Tz) -> Result<()> {
    let decoded =
        parse_pattern(pattern).with_context(|| format!("Could not decode '{pattern}'"))?;
    let rrule = generate_rrule(&decoded, tz)?;

    println!("{rrule}");
    Ok(())
}
