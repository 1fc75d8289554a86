// crates/config/src/error.rs
//! Error types for the configuration system

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while locating, reading or writing `config.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but holds only whitespace
    #[error("{path} is empty")]
    Empty { path: PathBuf },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Refused on save; every failing field is listed
    #[error("invalid config: {}", join(.0))]
    Invalid(Vec<ValidationError>),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no per-user config directory on this platform")]
    NoConfigDir,

    #[error("cannot migrate config from version {from}: {reason}")]
    Migration { from: u32, reason: String },

    /// An environment override carried a value of the wrong type
    #[error("invalid value for {variable}: {value}")]
    InvalidOverride { variable: String, value: String },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One rejected field, named by its dotted path (`player.load_timeout_secs`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(field, message)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {} (got {:?})", self.field, self.message, value),
            None => write!(f, "{} {}", self.field, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("network.app_name", "must not be empty");
        assert_eq!(err.to_string(), "network.app_name must not be empty");

        let err = ValidationError::with_value("player.load_timeout_secs", "must be 1..=120", 300);
        assert_eq!(
            err.to_string(),
            "player.load_timeout_secs must be 1..=120 (got \"300\")"
        );
    }

    #[test]
    fn test_invalid_lists_every_field() {
        let err = ConfigError::Invalid(vec![
            ValidationError::new("network.app_name", "must not be empty"),
            ValidationError::new("player.progress_interval_ms", "must be positive"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("invalid config: network.app_name"));
        assert!(text.contains("; player.progress_interval_ms"));
    }

    #[test]
    fn test_override_error_display() {
        let err = ConfigError::InvalidOverride {
            variable: "HYMNAL_PLAYER_LOAD_TIMEOUT_SECS".to_string(),
            value: "soon".to_string(),
        };
        assert!(err.to_string().contains("HYMNAL_PLAYER_LOAD_TIMEOUT_SECS"));
    }
}
