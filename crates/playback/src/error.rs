// crates/playback/src/error.rs

use hymnal_core::AppError;
use hymnal_network::NetworkError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Playback context is owned by another controller")]
    ContextLost,

    #[error("Playback failed: {0}")]
    PlaybackFailure(String),

    #[error("Could not resolve track: {0}")]
    Resolution(#[from] NetworkError),

    #[error("Load did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Nothing is loaded")]
    NothingLoaded,

    #[error("Queue is empty")]
    EmptyQueue,

    #[error("Start index {index} out of range for {len} entries")]
    StartOutOfRange { index: usize, len: usize },
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;

impl From<PlaybackError> for AppError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Resolution(e) => e.into(),
            PlaybackError::StartOutOfRange { index, len } => AppError::IndexOutOfRange {
                collection: "queue".to_string(),
                index,
                len,
            },
            PlaybackError::EmptyQueue => AppError::invalid_argument("playlist", "has no entries"),
            other => AppError::PlaybackFailure {
                message: other.to_string(),
            },
        }
    }
}
