use anyhow::{Context, Result};
use oxrecur_core::pattern::parse_pattern;

pub fn run(pattern: &str) -> Result<()> {
    let decoded =
        parse_pattern(pattern).with_context(|| format!("Could not decode '{pattern}'"))?;

    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(())
}
