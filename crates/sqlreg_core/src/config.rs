//! File-based configuration for the core services.
//!
//! # Responsibility
//! - Describe logging, upgrade policy, and database settings.
//! - Load them from a JSON file with defaults for omitted fields.
//!
//! # Invariants
//! - A loaded config has passed [`CoreConfig::validate`].

use crate::logging::default_log_level;
use crate::service::policy::ThresholdPolicy;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Logging settings. File logging is enabled only when `log_dir` is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Counter thresholds for the level upgrade policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpgradePolicyConfig {
    pub min_logins_for_silver: u32,
    pub min_recommends_for_gold: u32,
}

impl Default for UpgradePolicyConfig {
    fn default() -> Self {
        Self {
            min_logins_for_silver: ThresholdPolicy::DEFAULT_MIN_LOGINS_FOR_SILVER,
            min_recommends_for_gold: ThresholdPolicy::DEFAULT_MIN_RECOMMENDS_FOR_GOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub logging: LoggingConfig,
    pub upgrade: UpgradePolicyConfig,
    /// SQLite file; `None` means an in-memory database.
    pub database_path: Option<PathBuf>,
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upgrade.min_logins_for_silver == 0 {
            return Err(ConfigError::Invalid(
                "upgrade.min_logins_for_silver must be greater than 0".to_string(),
            ));
        }
        if self.upgrade.min_recommends_for_gold == 0 {
            return Err(ConfigError::Invalid(
                "upgrade.min_recommends_for_gold must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads and validates a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: CoreConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}
