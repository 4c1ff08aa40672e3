use anyhow::{Context, Result};
use oxrecur_core::freebusy::{FreeBusyData, generate_vfreebusy, merge_slots, parse_vfreebusy};

use crate::utils::read_input;

pub fn generate(input: &str, merge: bool) -> Result<()> {
    let content = read_input(input)?;
    let mut data: FreeBusyData =
        serde_json::from_str(&content).context("Invalid free-busy JSON")?;

    if merge {
        data.slots = merge_slots(&data.slots);
    }

    print!("{}", generate_vfreebusy(&data)?);
    Ok(())
}

pub fn parse(input: &str) -> Result<()> {
    let content = read_input(input)?;
    let data = parse_vfreebusy(&content)?;

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
