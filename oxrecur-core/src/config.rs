//! oxrecur configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::tz::parse_timezone;

static DEFAULT_TIMEZONE: &str = "UTC";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// Configuration at ~/.config/oxrecur/config.toml
///
/// Every field can be overridden with an `OXRECUR_` environment variable,
/// e.g. `OXRECUR_DEFAULT_TIMEZONE=Europe/Berlin`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OxRecurConfig {
    /// Zone used to render and read series ends when none is given
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

impl Default for OxRecurConfig {
    fn default() -> Self {
        OxRecurConfig {
            default_timezone: default_timezone(),
        }
    }
}

impl OxRecurConfig {
    pub fn config_path() -> CodecResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CodecError::Config("Could not determine config directory".into()))?
            .join("oxrecur");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user config, creating a commented template on first run.
    pub fn load() -> CodecResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load config from `path` (optional) layered under the environment.
    pub fn load_from(path: &Path) -> CodecResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("OXRECUR"))
            .build()
            .map_err(|e| CodecError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CodecError::Config(e.to_string()))
    }

    /// The configured default zone.
    pub fn timezone(&self) -> CodecResult<Tz> {
        parse_timezone(&self.default_timezone)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CodecResult<()> {
        let contents = format!(
            "\
# oxrecur configuration

# Zone whose wall clock series end dates refer to:
# default_timezone = \"{}\"
",
            DEFAULT_TIMEZONE
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;

        Ok(())
    }
}
