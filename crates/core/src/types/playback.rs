//! Playback-related domain models

use crate::types::PlaylistEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happens when the current track or the queue ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the queue
    #[default]
    Off,
    /// Replay the current track
    One,
    /// Wrap around to the first track
    All,
}

impl RepeatMode {
    /// The next mode in the Off → All → One → Off cycle
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::One => write!(f, "one"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "one" => Ok(Self::One),
            "all" => Ok(Self::All),
            other => Err(format!("unknown repeat mode '{}'", other)),
        }
    }
}

/// Snapshot of what is playing right now
///
/// There is one live session per app run; controllers hand out copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub current_entry: Option<PlaylistEntry>,
    pub is_playing: bool,
    /// Normalized progress, always within 0.0..=1.0
    pub progress: f64,
    pub current_time_secs: f64,
    pub duration_secs: f64,
    pub is_vocal: bool,
    pub repeat_mode: RepeatMode,
    pub is_shuffled: bool,
}

impl PlaybackSession {
    pub fn new(is_vocal: bool) -> Self {
        Self {
            current_entry: None,
            is_playing: false,
            progress: 0.0,
            current_time_secs: 0.0,
            duration_secs: 0.0,
            is_vocal,
            repeat_mode: RepeatMode::Off,
            is_shuffled: false,
        }
    }

    /// Clears timing fields, keeping preferences
    pub fn reset_timing(&mut self) {
        self.progress = 0.0;
        self.current_time_secs = 0.0;
        self.duration_secs = 0.0;
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(true)
    }
}
