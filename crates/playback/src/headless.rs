// crates/playback/src/headless.rs
//! In-memory player driven by explicit time steps

use crate::error::{PlaybackError, PlaybackResult};
use crate::player::{ItemTag, MediaItem, MediaPlayer, PlayerEvent};
use std::collections::{HashSet, VecDeque};

/// Length used for items that carry no duration hint
pub const DEFAULT_ITEM_SECS: f64 = 180.0;

#[derive(Debug, Clone)]
struct Loaded {
    item: MediaItem,
    duration: f64,
    started: bool,
}

impl Loaded {
    fn new(item: MediaItem, fallback: f64) -> Self {
        let duration = item.duration_hint.unwrap_or(fallback);
        Self {
            item,
            duration,
            started: false,
        }
    }
}

/// A player with no audio output
///
/// Time only moves when [`HeadlessPlayer::advance`] is called, which makes
/// queue behaviour reproducible.
#[derive(Debug)]
pub struct HeadlessPlayer {
    current: Option<Loaded>,
    upcoming: VecDeque<MediaItem>,
    position: f64,
    playing: bool,
    pending: Vec<PlayerEvent>,
    default_duration: f64,
    broken_urls: HashSet<String>,
}

impl HeadlessPlayer {
    pub fn new() -> Self {
        Self::with_default_duration(DEFAULT_ITEM_SECS)
    }

    pub fn with_default_duration(secs: f64) -> Self {
        Self {
            current: None,
            upcoming: VecDeque::new(),
            position: 0.0,
            playing: false,
            pending: Vec::new(),
            default_duration: secs,
            broken_urls: HashSet::new(),
        }
    }

    /// Makes every later `load` of `url` fail
    pub fn break_url(&mut self, url: impl Into<String>) {
        self.broken_urls.insert(url.into());
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.item.url.as_str())
    }

    pub fn upcoming_urls(&self) -> Vec<&str> {
        self.upcoming.iter().map(|i| i.url.as_str()).collect()
    }

    pub fn upcoming_tags(&self) -> Vec<ItemTag> {
        self.upcoming.iter().map(|i| i.tag).collect()
    }

    /// Moves playback forward by `secs`
    ///
    /// Crossing the end of the current item starts the next enqueued item,
    /// carrying the leftover time into it, or raises `ReachedEnd`.
    pub fn advance(&mut self, secs: f64) -> Vec<PlayerEvent> {
        let mut remaining = if secs.is_finite() { secs.max(0.0) } else { 0.0 };

        while self.playing && remaining > 0.0 {
            let Some((ended, duration)) = self.current.as_ref().map(|c| (c.item.tag, c.duration))
            else {
                break;
            };
            let left = duration - self.position;
            if remaining < left {
                self.position += remaining;
                break;
            }

            remaining -= left.max(0.0);
            match self.upcoming.pop_front() {
                Some(next) => {
                    let mut loaded = Loaded::new(next, self.default_duration);
                    loaded.started = true;
                    self.pending.push(PlayerEvent::ItemStarted {
                        tag: loaded.item.tag,
                    });
                    self.current = Some(loaded);
                    self.position = 0.0;
                }
                None => {
                    self.position = duration;
                    self.playing = false;
                    self.pending.push(PlayerEvent::ReachedEnd { tag: ended });
                }
            }
        }

        self.poll_events()
    }

    /// Aborts the current item with an error
    pub fn fail_current(&mut self, message: impl Into<String>) {
        if let Some(current) = self.current.as_ref() {
            self.playing = false;
            self.pending.push(PlayerEvent::Failed {
                tag: current.item.tag,
                message: message.into(),
            });
        }
    }
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlayer for HeadlessPlayer {
    fn load(&mut self, item: MediaItem) -> PlaybackResult<()> {
        self.upcoming.clear();
        self.playing = false;
        self.position = 0.0;

        if self.broken_urls.contains(&item.url) {
            self.current = None;
            return Err(PlaybackError::PlaybackFailure(format!(
                "cannot open {}",
                item.url
            )));
        }

        self.current = Some(Loaded::new(item, self.default_duration));
        Ok(())
    }

    fn enqueue(&mut self, item: MediaItem) -> PlaybackResult<()> {
        if self.broken_urls.contains(&item.url) {
            return Err(PlaybackError::PlaybackFailure(format!(
                "cannot open {}",
                item.url
            )));
        }
        self.upcoming.push_back(item);
        Ok(())
    }

    fn clear_upcoming(&mut self) {
        self.upcoming.clear();
    }

    fn play(&mut self) -> PlaybackResult<()> {
        let current = self.current.as_mut().ok_or(PlaybackError::NothingLoaded)?;
        if !current.started {
            current.started = true;
            self.pending.push(PlayerEvent::ItemStarted {
                tag: current.item.tag,
            });
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.current = None;
        self.upcoming.clear();
        self.playing = false;
        self.position = 0.0;
    }

    fn seek(&mut self, secs: f64) -> PlaybackResult<()> {
        let current = self.current.as_ref().ok_or(PlaybackError::NothingLoaded)?;
        if !secs.is_finite() {
            return Err(PlaybackError::PlaybackFailure(format!(
                "cannot seek to {}",
                secs
            )));
        }
        self.position = secs.clamp(0.0, current.duration);
        Ok(())
    }

    fn position_secs(&self) -> f64 {
        self.position
    }

    fn duration_secs(&self) -> f64 {
        self.current.as_ref().map_or(0.0, |c| c.duration)
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn current_tag(&self) -> Option<ItemTag> {
        self.current.as_ref().map(|c| c.item.tag)
    }

    fn poll_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, secs: f64) -> MediaItem {
        MediaItem::new(url, ItemTag::next()).with_duration(secs)
    }

    #[test]
    fn test_play_emits_started_once() {
        let mut player = HeadlessPlayer::new();
        let first = item("a", 10.0);
        let tag = first.tag;
        player.load(first).unwrap();

        player.play().unwrap();
        player.pause();
        player.play().unwrap();

        assert_eq!(player.poll_events(), vec![PlayerEvent::ItemStarted { tag }]);
    }

    #[test]
    fn test_advance_into_enqueued_item() {
        let mut player = HeadlessPlayer::new();
        let first = item("a", 10.0);
        let second = item("b", 10.0);
        let second_tag = second.tag;
        player.load(first).unwrap();
        player.enqueue(second).unwrap();
        player.play().unwrap();
        player.poll_events();

        let events = player.advance(12.0);

        assert_eq!(events, vec![PlayerEvent::ItemStarted { tag: second_tag }]);
        assert_eq!(player.current_url(), Some("b"));
        assert!((player.position_secs() - 2.0).abs() < 1e-9);
        assert!(player.upcoming_urls().is_empty());
    }

    #[test]
    fn test_reached_end_without_upcoming() {
        let mut player = HeadlessPlayer::new();
        let only = item("a", 5.0);
        let tag = only.tag;
        player.load(only).unwrap();
        player.play().unwrap();
        player.poll_events();

        let events = player.advance(6.0);

        assert_eq!(events, vec![PlayerEvent::ReachedEnd { tag }]);
        assert!(!player.is_playing());
        assert_eq!(player.position_secs(), 5.0);
        assert!(player.advance(1.0).is_empty());
    }

    #[test]
    fn test_paused_player_does_not_move() {
        let mut player = HeadlessPlayer::new();
        player.load(item("a", 5.0)).unwrap();
        player.advance(3.0);
        assert_eq!(player.position_secs(), 0.0);
    }

    #[test]
    fn test_load_clears_upcoming() {
        let mut player = HeadlessPlayer::new();
        player.load(item("a", 5.0)).unwrap();
        player.enqueue(item("b", 5.0)).unwrap();
        player.load(item("c", 5.0)).unwrap();
        assert!(player.upcoming_urls().is_empty());
        assert_eq!(player.current_url(), Some("c"));
    }

    #[test]
    fn test_broken_url_fails_to_load() {
        let mut player = HeadlessPlayer::new();
        player.break_url("bad");
        assert!(player.load(item("bad", 5.0)).is_err());
        assert!(player.current_tag().is_none());
        assert!(matches!(player.play(), Err(PlaybackError::NothingLoaded)));
    }

    #[test]
    fn test_seek_clamps_to_item() {
        let mut player = HeadlessPlayer::new();
        player.load(item("a", 5.0)).unwrap();
        player.seek(99.0).unwrap();
        assert_eq!(player.position_secs(), 5.0);
        assert!(player.seek(f64::NAN).is_err());
    }

    #[test]
    fn test_fail_current() {
        let mut player = HeadlessPlayer::new();
        let only = item("a", 5.0);
        let tag = only.tag;
        player.load(only).unwrap();
        player.play().unwrap();
        player.poll_events();

        player.fail_current("decoder");

        assert!(!player.is_playing());
        assert_eq!(
            player.poll_events(),
            vec![PlayerEvent::Failed {
                tag,
                message: "decoder".to_string()
            }]
        );
    }

    #[test]
    fn test_default_duration_applies_without_hint() {
        let mut player = HeadlessPlayer::with_default_duration(42.0);
        player.load(MediaItem::new("a", ItemTag::next())).unwrap();
        assert_eq!(player.duration_secs(), 42.0);
    }
}
