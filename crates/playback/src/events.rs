// crates/playback/src/events.rs
//! Published playback state

use hymnal_core::{HymnRef, RepeatMode};
use tokio::sync::broadcast;

/// Lifecycle of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Why a track was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTrigger {
    /// The controller loaded it in response to a command
    UserRequested,
    /// The player moved on to a preloaded item by itself
    PlayerAdvanced,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    StateChanged {
        state: PlaybackState,
    },
    NowPlaying {
        hymn: HymnRef,
        title: String,
        vocal: bool,
        trigger: LoadTrigger,
    },
    QueueChanged {
        cursor: usize,
        len: usize,
        shuffled: bool,
    },
    RepeatModeChanged {
        mode: RepeatMode,
    },
    /// The last entry ended with repeat off
    QueueFinished,
    Error {
        message: String,
    },
}

/// Broadcast channel for playback events
///
/// Publishing never fails; with no subscribers the event is dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlaybackEvent>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: PlaybackEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.publish(PlaybackEvent::QueueFinished);
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(PlaybackEvent::StateChanged {
            state: PlaybackState::Loading,
        });
        bus.publish(PlaybackEvent::StateChanged {
            state: PlaybackState::Playing,
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            PlaybackEvent::StateChanged {
                state: PlaybackState::Loading
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            PlaybackEvent::StateChanged {
                state: PlaybackState::Playing
            }
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PlaybackState::Paused.to_string(), "paused");
    }
}
