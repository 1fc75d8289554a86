// crates/playback/src/player.rs
//! The media player seam

use crate::error::PlaybackResult;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ITEM_TAG: AtomicU64 = AtomicU64::new(1);

/// Identifies one load or enqueue
///
/// Tags are unique for the process lifetime, so a notification can always be
/// matched to the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemTag(u64);

impl ItemTag {
    pub fn next() -> Self {
        Self(NEXT_ITEM_TAG.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// A stream handed to the player
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub url: String,
    pub tag: ItemTag,
    /// Length reported by the catalog, when known
    pub duration_hint: Option<f64>,
}

impl MediaItem {
    pub fn new(url: impl Into<String>, tag: ItemTag) -> Self {
        Self {
            url: url.into(),
            tag,
            duration_hint: None,
        }
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_hint = (secs.is_finite() && secs > 0.0).then_some(secs);
        self
    }
}

/// Notifications from the player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// An item began playing, either after `play` or by advancing to an enqueued item
    ItemStarted { tag: ItemTag },
    /// The current item finished and nothing was enqueued after it
    ReachedEnd { tag: ItemTag },
    /// The current item stopped with an error
    Failed { tag: ItemTag, message: String },
}

impl PlayerEvent {
    pub fn tag(&self) -> ItemTag {
        match self {
            PlayerEvent::ItemStarted { tag }
            | PlayerEvent::ReachedEnd { tag }
            | PlayerEvent::Failed { tag, .. } => *tag,
        }
    }
}

/// A queue-capable audio player
///
/// `load` replaces the current item and drops anything enqueued. When the
/// current item ends the player starts the next enqueued item on its own.
pub trait MediaPlayer: Send {
    fn load(&mut self, item: MediaItem) -> PlaybackResult<()>;

    /// Appends an item to play after the current one
    fn enqueue(&mut self, item: MediaItem) -> PlaybackResult<()>;

    /// Drops every enqueued item, leaving the current one alone
    fn clear_upcoming(&mut self);

    fn play(&mut self) -> PlaybackResult<()>;

    fn pause(&mut self);

    /// Stops and unloads everything
    fn stop(&mut self);

    fn seek(&mut self, secs: f64) -> PlaybackResult<()>;

    fn position_secs(&self) -> f64;

    /// Length of the current item; zero or NaN when unknown
    fn duration_secs(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Tag of the item currently loaded
    fn current_tag(&self) -> Option<ItemTag>;

    /// Drains notifications raised since the last call
    fn poll_events(&mut self) -> Vec<PlayerEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_unique_and_increasing() {
        let a = ItemTag::next();
        let b = ItemTag::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_duration_hint_ignores_garbage() {
        let tag = ItemTag::next();
        assert_eq!(MediaItem::new("u", tag).with_duration(0.0).duration_hint, None);
        assert_eq!(
            MediaItem::new("u", tag).with_duration(f64::NAN).duration_hint,
            None
        );
        assert_eq!(
            MediaItem::new("u", tag).with_duration(90.5).duration_hint,
            Some(90.5)
        );
    }

    #[test]
    fn test_event_tag() {
        let tag = ItemTag::next();
        let event = PlayerEvent::Failed {
            tag,
            message: "decoder".to_string(),
        };
        assert_eq!(event.tag(), tag);
    }
}
