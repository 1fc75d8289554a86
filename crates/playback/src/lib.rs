// crates/playback/src/lib.rs
//! Hymn playback control
//!
//! Two controllers share one player through a [`PlaybackContext`]:
//! [`QueueCoordinator`] plays playlists with shuffle, repeat, preloading
//! and auto-advance; [`SingleTrackController`] plays one hymn and flips
//! between its vocal and instrumental takes. Both publish [`PlaybackEvent`]s
//! and progress snapshots.

mod context;
mod coordinator;
mod error;
mod events;
mod headless;
mod player;
mod progress;
mod queue;
mod single;

pub use context::{ContextTag, PlaybackContext};
pub use coordinator::{ControllerSettings, QueueCoordinator};
pub use error::{PlaybackError, PlaybackResult};
pub use events::{EventBus, LoadTrigger, PlaybackEvent, PlaybackState};
pub use headless::{HeadlessPlayer, DEFAULT_ITEM_SECS};
pub use player::{ItemTag, MediaItem, MediaPlayer, PlayerEvent};
pub use progress::{ProgressObserver, ProgressSettings, ProgressSnapshot, ProgressTracker};
pub use queue::PlaybackQueue;
pub use single::SingleTrackController;
