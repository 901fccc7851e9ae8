//! Runtime configuration resolved from environment variables.
//!
//! | Variable                | Default                          |
//! |-------------------------|----------------------------------|
//! | `PINNOTE_DB_PATH`       | `<temp dir>/pinnote.sqlite3`     |
//! | `PINNOTE_LOG_LEVEL`     | `default_log_level()`            |
//! | `PINNOTE_LOG_DIR`       | unset: file logging disabled     |
//! | `PINNOTE_PIN_SETTLE_MS` | `200`                            |
//!
//! Blank values count as unset.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "PINNOTE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PINNOTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PINNOTE_LOG_DIR";
pub const ENV_PIN_SETTLE_MS: &str = "PINNOTE_PIN_SETTLE_MS";

const DEFAULT_DB_FILE_NAME: &str = "pinnote.sqlite3";
const DEFAULT_PIN_SETTLE_MS: u64 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidLogDir(String),
    InvalidSettleDelay(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{ENV_LOG_LEVEL}: {message}"),
            Self::InvalidLogDir(message) => write!(f, "{ENV_LOG_DIR}: {message}"),
            Self::InvalidSettleDelay(value) => write!(
                f,
                "{ENV_PIN_SETTLE_MS}: expected milliseconds as an unsigned integer, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Pause between a PIN match and navigating to the note.
    pub pin_settle_delay: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            pin_settle_delay: Duration::from_millis(DEFAULT_PIN_SETTLE_MS),
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(dir) = value(ENV_LOG_DIR) {
            config.log_dir = Some(normalize_log_dir(&dir).map_err(ConfigError::InvalidLogDir)?);
        }
        if let Some(raw) = value(ENV_PIN_SETTLE_MS) {
            let millis = raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSettleDelay(raw.clone()))?;
            config.pin_settle_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }
}
