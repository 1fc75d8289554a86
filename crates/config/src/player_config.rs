//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use hymnal_core::RepeatMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback timing and session defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Progress sampling interval in milliseconds
    pub progress_interval_ms: u64,

    /// Pause between end-of-track and the progress reset, in milliseconds
    pub end_reset_delay_ms: u64,

    /// Give up on a load that has not finished after this many seconds
    pub load_timeout_secs: u64,

    /// Start with the vocal recording when one exists
    pub prefer_vocal: bool,

    /// Repeat mode for new sessions
    pub repeat_mode: RepeatMode,

    /// Shuffle new sessions
    pub shuffle: bool,
}

impl PlayerConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn end_reset_delay(&self) -> Duration {
        Duration::from_millis(self.end_reset_delay_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 16,
            end_reset_delay_ms: 500,
            load_timeout_secs: 10,
            prefer_vocal: true,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.progress_interval_ms,
                1,
                1000,
                "player.progress_interval_ms",
            ),
            Validator::in_range(
                self.end_reset_delay_ms,
                0,
                5000,
                "player.end_reset_delay_ms",
            ),
            Validator::in_range(self.load_timeout_secs, 1, 120, "player.load_timeout_secs"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.progress_interval_ms = other.progress_interval_ms;
        self.end_reset_delay_ms = other.end_reset_delay_ms;
        self.load_timeout_secs = other.load_timeout_secs;
        self.prefer_vocal = other.prefer_vocal;
        self.repeat_mode = other.repeat_mode;
        self.shuffle = other.shuffle;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.progress_interval(), Duration::from_millis(16));
        assert_eq!(config.end_reset_delay(), Duration::from_millis(500));
        assert_eq!(config.load_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_interval() {
        let mut config = PlayerConfig::default();
        config.progress_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = PlayerConfig::default();
        config.load_timeout_secs = 121;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge() {
        let mut base = PlayerConfig::default();
        let other = PlayerConfig {
            repeat_mode: RepeatMode::All,
            shuffle: true,
            ..Default::default()
        };

        base.merge(other);
        assert_eq!(base.repeat_mode, RepeatMode::All);
        assert!(base.shuffle);
    }

    #[test]
    fn test_multiple_validation_errors() {
        let config = PlayerConfig {
            progress_interval_ms: 5000,
            end_reset_delay_ms: 9000,
            load_timeout_secs: 0,
            ..Default::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().len(), 3);
    }

    #[test]
    fn test_repeat_mode_parses_lowercase() {
        let config: PlayerConfig = toml::from_str("repeat_mode = \"one\"").unwrap();
        assert_eq!(config.repeat_mode, RepeatMode::One);
        assert_eq!(config.load_timeout_secs, 10);
    }
}
