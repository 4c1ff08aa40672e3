use std::io::Read;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use oxrecur_core::config::OxRecurConfig;
use oxrecur_core::tz::parse_timezone;
use tracing::debug;

/// Use the zone given on the command line, else the configured default.
pub fn resolve_timezone(
    tz: Option<&str>,
    load_config: impl FnOnce() -> Result<OxRecurConfig>,
) -> Result<Tz> {
    match tz {
        Some(name) => Ok(parse_timezone(name)?),
        None => {
            let tz = load_config()?.timezone()?;
            debug!(%tz, "using configured default timezone");
            Ok(tz)
        }
    }
}

/// Parse a series start: RFC 3339, or a local date/date-time in `tz`.
pub fn parse_start(s: &str, tz: Tz) -> Result<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&tz));
    }

    let local = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .with_context(|| {
            format!("Invalid start '{s}'. Expected RFC 3339 or YYYY-MM-DD[THH:MM[:SS]]")
        })?;

    tz.from_local_datetime(&local)
        .earliest()
        .with_context(|| format!("Start '{s}' does not exist in {tz}"))
}

/// Read a file, or stdin when `input` is "-".
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Could not read stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Could not read {input}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::Europe;

    #[test]
    fn test_parse_start_rfc3339() {
        let start = parse_start("2008-10-01T13:05:00Z", Europe::Berlin).unwrap();
        assert_eq!(start.timezone(), Europe::Berlin);
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2008, 10, 1, 13, 5, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_start_local_in_zone() {
        let start = parse_start("2008-10-01T15:05", Europe::Berlin).unwrap();
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2008, 10, 1, 13, 5, 0).unwrap()
        );

        let date = parse_start("2008-10-01", Tz::UTC).unwrap();
        assert_eq!(date.timestamp(), 1222819200);
    }

    #[test]
    fn test_parse_start_rejects_garbage() {
        assert!(parse_start("next tuesday", Tz::UTC).is_err());
    }

    #[test]
    fn test_resolve_timezone_prefers_argument() {
        let tz = resolve_timezone(Some("Europe/Berlin"), || {
            anyhow::bail!("config should not be loaded")
        })
        .unwrap();
        assert_eq!(tz, Europe::Berlin);
    }

    #[test]
    fn test_resolve_timezone_falls_back_to_config() {
        let tz = resolve_timezone(None, || {
            Ok(OxRecurConfig {
                default_timezone: "America/New_York".to_string(),
            })
        })
        .unwrap();
        assert_eq!(tz, chrono_tz::America::New_York);
    }
}
