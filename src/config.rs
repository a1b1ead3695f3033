//! Deployment configuration.
//!
//! Configuration is read from a TOML file. Every key is optional; missing
//! keys and a missing file both fall back to the defaults below.
//!
//! ```toml
//! worksheet = "Tasks"
//! timezone = "Asia/Kolkata"
//! data_dir = ".taskmaster"
//!
//! [retry]
//! max_attempts = 5
//! base_delay_ms = 1000
//! max_jitter_ms = 1000
//! ```

use crate::task::services::{RetryPolicy, SessionSettings, retry};
use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{io, time::Duration};
use thiserror::Error;

/// Default worksheet name.
pub const DEFAULT_WORKSHEET: &str = "Tasks";

/// Default timezone.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Default directory for the file-backed worksheet.
pub const DEFAULT_DATA_DIR: &str = ".taskmaster";

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration: {0}")]
    Read(#[source] io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The timezone is not a known IANA zone name.
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
}

/// Backoff settings as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per remote call, including the first.
    pub max_attempts: u32,
    /// Base delay in milliseconds, doubled after each failure.
    pub base_delay_ms: u64,
    /// Upper bound in milliseconds for the random jitter.
    pub max_jitter_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts(),
            base_delay_ms: duration_ms(retry::DEFAULT_BASE_DELAY),
            max_jitter_ms: duration_ms(retry::DEFAULT_MAX_JITTER),
        }
    }
}

impl RetrySettings {
    /// Builds the retry policy described by these settings.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy::immediate(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_jitter(Duration::from_millis(self.max_jitter_ms))
    }
}

/// Task tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Name of the backing worksheet.
    pub worksheet: String,
    /// IANA timezone for timestamps and the day boundary.
    pub timezone: String,
    /// Directory holding file-backed worksheets.
    pub data_dir: String,
    /// Backoff for remote calls.
    pub retry: RetrySettings,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            worksheet: DEFAULT_WORKSHEET.to_owned(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            data_dir: DEFAULT_DATA_DIR.to_owned(),
            retry: RetrySettings::default(),
        }
    }
}

impl TrackerConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::UnknownTimezone`] for an unknown zone.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.zone()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file, using defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, or any
    /// error of [`TrackerConfig::from_toml_str`].
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let Some(file_name) = path.file_name() else {
            return Err(ConfigError::Read(io::Error::new(
                io::ErrorKind::InvalidInput,
                "configuration path must include a file name",
            )));
        };
        let parent = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(ConfigError::Read(err)),
        };
        match dir.read_to_string(file_name) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Read(err)),
        }
    }

    /// Returns the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTimezone`] when the name is not a
    /// known IANA zone.
    pub fn zone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    /// Builds session settings from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTimezone`] when the zone is unknown.
    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        Ok(SessionSettings {
            zone: self.zone()?,
            retry: self.retry.policy(),
        })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
