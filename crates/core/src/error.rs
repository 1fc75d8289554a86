//! Error types and recovery strategies for the hymnal core
//!
//! Errors fall into three severity tiers:
//! - **Recoverable**: the operation can be attempted again (network glitch)
//! - **Degraded**: the single operation is abandoned, the app continues
//! - **Fatal**: persisted state is unusable and needs user intervention
//!
//! Nothing in the playback core is surfaced as a blocking alert; callers log
//! the error and use `severity()` to decide how loud to be.

use std::fmt;
use std::io;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Fall back to a known-good default and carry on
    UseFallback,
    /// Skip the current item and move on to the next one
    SkipItem,
    /// Abandon this attempt and leave state as it was
    Abandon,
    /// Reset persisted state to defaults
    ResetState,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseFallback => write!(f, "Using fallback"),
            Self::SkipItem => write!(f, "Skipping item"),
            Self::Abandon => write!(f, "Abandoning attempt"),
            Self::ResetState => write!(f, "Resetting state"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be automatically recovered from
    Recoverable,
    /// Operation abandoned but app can continue
    Degraded,
    /// Persisted state is unusable
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for the hymnal core
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Resolution Errors =====
    /// The network could not be reached
    #[error("Network unavailable: {message}")]
    NetworkUnavailable { message: String },

    /// A remote endpoint answered with something we could not interpret
    #[error("Malformed response from {endpoint}: {details}")]
    MalformedResponse { endpoint: String, details: String },

    /// A computed track position is beyond the remote track list
    #[error("Index {index} out of range for collection {collection} ({len} tracks)")]
    IndexOutOfRange {
        collection: String,
        index: usize,
        len: usize,
    },

    /// The stream URL could not be constructed
    #[error("Invalid stream URL: {url}")]
    InvalidStreamUrl { url: String },

    // ===== Playback Errors =====
    /// The media player failed while loading or playing
    #[error("Playback failure: {message}")]
    PlaybackFailure { message: String },

    // ===== Library Errors =====
    /// Playlist does not exist
    #[error("Playlist not found: {id}")]
    PlaylistNotFound { id: String },

    /// Entry does not exist in the playlist
    #[error("Entry {entry} not found in playlist {playlist}")]
    EntryNotFound { playlist: String, entry: String },

    /// Attempted to mutate a system-managed playlist
    #[error("Playlist '{name}' is managed by the app and cannot be modified")]
    ReadOnlyPlaylist { name: String },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },

    // ===== Storage Errors =====
    /// Key-value storage failed
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Persisted JSON could not be read or written
    #[error("Serialization error for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NetworkUnavailable { .. } => ErrorSeverity::Recoverable,

            Self::MalformedResponse { .. }
            | Self::IndexOutOfRange { .. }
            | Self::InvalidStreamUrl { .. }
            | Self::PlaybackFailure { .. }
            | Self::PlaylistNotFound { .. }
            | Self::EntryNotFound { .. }
            | Self::ReadOnlyPlaylist { .. }
            | Self::InvalidArgument { .. } => ErrorSeverity::Degraded,

            Self::Storage { .. } | Self::Serialization { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::NetworkUnavailable { .. } => RecoveryAction::UseFallback,
            Self::PlaybackFailure { .. } => RecoveryAction::SkipItem,
            Self::MalformedResponse { .. }
            | Self::IndexOutOfRange { .. }
            | Self::InvalidStreamUrl { .. } => RecoveryAction::Abandon,
            Self::Serialization { .. } => RecoveryAction::ResetState,
            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a short message suitable for a status line
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkUnavailable { .. } => {
                "Cannot reach the music service. Please check your connection.".to_string()
            }
            Self::MalformedResponse { .. } | Self::InvalidStreamUrl { .. } => {
                "The music service returned unexpected data.".to_string()
            }
            Self::IndexOutOfRange { .. } => "This hymn has no recording yet.".to_string(),
            Self::PlaybackFailure { .. } => "Playback stopped unexpectedly.".to_string(),
            Self::PlaylistNotFound { .. } | Self::EntryNotFound { .. } => {
                "The requested item was not found.".to_string()
            }
            Self::ReadOnlyPlaylist { name } => format!("'{}' cannot be edited.", name),
            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
            Self::Storage { .. } | Self::Serialization { .. } => {
                "Saved playlists could not be read.".to_string()
            }
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Helper to create a storage error from an I/O error
    pub fn storage(message: impl Into<String>, source: io::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Helper to create an invalid-argument error
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
