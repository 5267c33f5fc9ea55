//! Global celebrate configuration.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::celebration::{DEFAULT_LEAD_DAYS, ReminderTime};
use crate::date::LeapDayPolicy;
use crate::error::{CelebrateError, CelebrateResult};
use crate::language::Language;

static DEFAULT_DATA_DIR: &str = "~/.local/share/celebrate";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_lead_days() -> u32 {
    DEFAULT_LEAD_DAYS
}

/// Defaults applied to new celebrations when the caller doesn't say otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDefaults {
    #[serde(default = "default_lead_days")]
    pub lead_days: u32,
    #[serde(default)]
    pub time: ReminderTime,
}

impl Default for ReminderDefaults {
    fn default() -> Self {
        ReminderDefaults {
            lead_days: DEFAULT_LEAD_DAYS,
            time: ReminderTime::default(),
        }
    }
}

/// Configuration at ~/.config/celebrate/config.toml
///
/// Keys can be overridden from the environment: `CELEBRATE_LANGUAGE=cs`,
/// `CELEBRATE_REMINDERS__LEAD_DAYS=3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CelebrateConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub leap_day: LeapDayPolicy,

    #[serde(default)]
    pub reminders: ReminderDefaults,
}

impl Default for CelebrateConfig {
    fn default() -> Self {
        CelebrateConfig {
            data_dir: default_data_dir(),
            language: Language::default(),
            leap_day: LeapDayPolicy::default(),
            reminders: ReminderDefaults::default(),
        }
    }
}

impl CelebrateConfig {
    pub fn config_path() -> CelebrateResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CelebrateError::Config("Could not determine config directory".into()))?
            .join("celebrate");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when None.
    ///
    /// The default location gets a commented-out config file on first use.
    pub fn load(path: Option<&Path>) -> CelebrateResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::config_path()?;
                if !p.exists() {
                    Self::create_default_config(&p)?;
                }
                p
            }
        };

        Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix("CELEBRATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CelebrateError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CelebrateError::Config(e.to_string()))
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CelebrateResult<()> {
        let contents = format!(
            "\
# celebrate configuration

# Where celebrations, custom types and pending reminders are stored:
# data_dir = \"{}\"

# Language for dates and reminder texts (en, cs, de):
# language = \"en\"

# Where Feb 29 celebrations fall in other years (feb28, mar1):
# leap_day = \"feb28\"

# Reminder defaults for new celebrations:
# [reminders]
# lead_days = {}
# time = \"09:00\"
",
            DEFAULT_DATA_DIR, DEFAULT_LEAD_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CelebrateError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CelebrateError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
