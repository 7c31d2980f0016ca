//! Engine configuration, read from the environment.

use std::time::Duration;

use thiserror::Error;

use yad_observability::LogFormat;

pub const REPOSITORY_TIMEOUT_VAR: &str = "YAD_REPOSITORY_TIMEOUT_MS";
pub const ASSIGNMENT_ATTEMPTS_VAR: &str = "YAD_ASSIGNMENT_ATTEMPTS";
pub const LOG_FORMAT_VAR: &str = "YAD_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on every repository call.
    pub repository_timeout: Duration,
    /// Select-and-reserve attempts on payment before giving up with a conflict.
    pub assignment_attempts: u32,
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            repository_timeout: Duration::from_millis(2000),
            assignment_attempts: 3,
            log_format: LogFormat::Json,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(REPOSITORY_TIMEOUT_VAR) {
            let ms: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: REPOSITORY_TIMEOUT_VAR,
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
            config.repository_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup(ASSIGNMENT_ATTEMPTS_VAR) {
            let attempts: u32 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: ASSIGNMENT_ATTEMPTS_VAR,
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
            if attempts == 0 {
                return Err(ConfigError::Invalid {
                    key: ASSIGNMENT_ATTEMPTS_VAR,
                    value: raw,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.assignment_attempts = attempts;
        }

        if let Some(raw) = lookup(LOG_FORMAT_VAR) {
            config.log_format = raw.parse().map_err(|e| ConfigError::Invalid {
                key: LOG_FORMAT_VAR,
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
        }

        Ok(config)
    }
}
