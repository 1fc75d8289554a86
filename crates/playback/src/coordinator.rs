// crates/playback/src/coordinator.rs
//! Playlist playback: queue order, preloading and auto-advance

use crate::context::{ContextTag, PlaybackContext};
use crate::error::{PlaybackError, PlaybackResult};
use crate::events::{EventBus, LoadTrigger, PlaybackEvent, PlaybackState};
use crate::player::{ItemTag, MediaItem, MediaPlayer, PlayerEvent};
use crate::progress::{ProgressObserver, ProgressSettings, ProgressSnapshot};
use crate::queue::PlaybackQueue;
use hymnal_core::{HymnRef, PlaybackSession, Playlist, RepeatMode};
use hymnal_network::{ResolvedStream, TrackResolver};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Tunables shared by both controllers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    /// Upper bound on resolve + load before giving up
    pub load_timeout: Duration,
    /// Start with vocal recordings
    pub prefer_vocal: bool,
    pub progress: ProgressSettings,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(10),
            prefer_vocal: true,
            progress: ProgressSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Current {
    tag: ItemTag,
    started: bool,
}

#[derive(Debug, Clone, Copy)]
struct Preloaded {
    tag: ItemTag,
    position: usize,
}

/// Plays a playlist through the shared player
///
/// Every load and enqueue carries a fresh [`ItemTag`]. Player notifications
/// are matched against the tag last loaded and the tag preloaded; anything
/// else is stale and dropped.
pub struct QueueCoordinator<P, R> {
    owner: ContextTag,
    context: PlaybackContext<P>,
    resolver: R,
    settings: ControllerSettings,
    queue: Option<PlaybackQueue>,
    state: PlaybackState,
    repeat_mode: RepeatMode,
    is_vocal: bool,
    current: Option<Current>,
    preloaded: Option<Preloaded>,
    last_trigger: Option<LoadTrigger>,
    rng: StdRng,
    events: EventBus,
    progress: ProgressObserver<P>,
}

impl<P: MediaPlayer + 'static, R: TrackResolver> QueueCoordinator<P, R> {
    pub fn new(context: PlaybackContext<P>, resolver: R, settings: ControllerSettings) -> Self {
        let owner = ContextTag::next();
        Self {
            owner,
            progress: ProgressObserver::new(context.clone(), owner, settings.progress),
            context,
            resolver,
            settings,
            queue: None,
            state: PlaybackState::Idle,
            repeat_mode: RepeatMode::Off,
            is_vocal: settings.prefer_vocal,
            current: None,
            preloaded: None,
            last_trigger: None,
            rng: StdRng::from_entropy(),
            events: EventBus::new(),
        }
    }

    /// Uses a fixed random source for shuffling
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Publishes on a shared bus instead of a private one
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn owner(&self) -> ContextTag {
        self.owner
    }

    /// Idle once another controller has claimed the shared player
    pub fn state(&self) -> PlaybackState {
        if self.context.is_owned_by(self.owner) {
            self.state
        } else {
            PlaybackState::Idle
        }
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn is_shuffled(&self) -> bool {
        self.queue.as_ref().is_some_and(|q| q.is_shuffled())
    }

    pub fn queue(&self) -> Option<&PlaybackQueue> {
        self.queue.as_ref()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.queue.as_ref().map(|q| q.cursor())
    }

    pub fn last_trigger(&self) -> Option<LoadTrigger> {
        self.last_trigger
    }

    /// Tag of the enqueued next item, if any
    pub fn preloaded_tag(&self) -> Option<ItemTag> {
        self.preloaded.map(|p| p.tag)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    pub fn progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.subscribe()
    }

    /// Seeks within the current track
    pub fn seek(&mut self, fraction: f64) {
        if self.current.is_some() {
            self.progress.seek(fraction);
        }
    }

    /// Snapshot of the live session
    pub fn session(&self) -> PlaybackSession {
        let progress = self.progress.snapshot();
        PlaybackSession {
            current_entry: self
                .current
                .and(self.queue.as_ref())
                .map(|q| q.current().clone()),
            is_playing: self.state() == PlaybackState::Playing,
            progress: progress.progress,
            current_time_secs: progress.elapsed_secs,
            duration_secs: progress.duration_secs,
            is_vocal: self.is_vocal,
            repeat_mode: self.repeat_mode,
            is_shuffled: self.is_shuffled(),
        }
    }

    /// Starts `playlist` at entry `start`
    ///
    /// Only an empty playlist or a bad start index is an error; resolution
    /// problems are logged and published, leaving the coordinator idle.
    pub async fn play_playlist(
        &mut self,
        playlist: &Playlist,
        start: usize,
        shuffled: bool,
    ) -> PlaybackResult<()> {
        let queue = PlaybackQueue::new(playlist.entries.clone(), start, shuffled, &mut self.rng)?;
        log::info!(
            "Playing '{}' from entry {} ({} entries{})",
            playlist.name,
            start,
            queue.len(),
            if shuffled { ", shuffled" } else { "" }
        );

        self.context.claim(self.owner);
        self.go_idle();
        let first = queue.cursor();
        self.queue = Some(queue);
        self.load_position(first, LoadTrigger::UserRequested).await;
        Ok(())
    }

    pub async fn next_song(&mut self) {
        if self.state == PlaybackState::Loading {
            log::debug!("next ignored while loading");
            return;
        }
        if let Some(position) = self.queue.as_ref().map(|q| q.next_position()) {
            self.load_position(position, LoadTrigger::UserRequested)
                .await;
        }
    }

    pub async fn previous_song(&mut self) {
        if self.state == PlaybackState::Loading {
            log::debug!("previous ignored while loading");
            return;
        }
        if let Some(position) = self.queue.as_ref().map(|q| q.previous_position()) {
            self.load_position(position, LoadTrigger::UserRequested)
                .await;
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if self.drive(|p| p.pause()).is_some() {
            self.set_state(PlaybackState::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state != PlaybackState::Paused {
            return;
        }
        match self.drive(|p| p.play()) {
            Some(Ok(())) => self.set_state(PlaybackState::Playing),
            Some(Err(e)) => {
                self.report(&e);
                self.go_idle();
            }
            None => {}
        }
    }

    /// Stops playback; the queue is kept
    pub fn stop(&mut self) {
        self.go_idle();
    }

    /// Flips shuffle without interrupting the current track
    pub async fn toggle_shuffle(&mut self) {
        let Some(queue) = self.queue.as_mut() else {
            return;
        };
        let shuffled = !queue.is_shuffled();
        queue.set_shuffled(shuffled, &mut self.rng);
        log::debug!("Shuffle {}", if shuffled { "on" } else { "off" });
        self.publish_queue();

        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            self.preload_next().await;
        }
    }

    pub async fn set_repeat_mode(&mut self, mode: RepeatMode) {
        if mode == self.repeat_mode {
            return;
        }
        self.repeat_mode = mode;
        self.events
            .publish(PlaybackEvent::RepeatModeChanged { mode });

        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            self.preload_next().await;
        }
    }

    /// Off → All → One → Off
    pub async fn cycle_repeat_mode(&mut self) -> RepeatMode {
        let mode = self.repeat_mode.cycled();
        self.set_repeat_mode(mode).await;
        mode
    }

    /// Drains the player's notifications and reacts to each
    pub async fn pump_player_events(&mut self) -> usize {
        let events = self.context.with_player(|p| p.poll_events());
        let count = events.len();
        for event in events {
            self.handle_player_event(event).await;
        }
        count
    }

    pub async fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::ItemStarted { tag } => self.on_item_started(tag).await,
            PlayerEvent::ReachedEnd { tag } => {
                if self.is_current(tag) {
                    self.on_track_ended(false).await;
                } else {
                    log::debug!("Ignoring end of stale {}", tag);
                }
            }
            PlayerEvent::Failed { tag, message } => {
                if self.is_current(tag) {
                    self.progress.track_failed(&message);
                    self.events.publish(PlaybackEvent::Error {
                        message: message.clone(),
                    });
                    self.on_track_ended(true).await;
                } else if self.preloaded.is_some_and(|p| p.tag == tag) {
                    log::warn!("Preloaded {} failed: {}", tag, message);
                    self.preloaded = None;
                } else {
                    log::debug!("Ignoring failure of stale {}", tag);
                }
            }
        }
    }

    fn is_current(&self, tag: ItemTag) -> bool {
        self.current.is_some_and(|c| c.tag == tag)
    }

    async fn on_item_started(&mut self, tag: ItemTag) {
        if let Some(current) = self.current.as_mut() {
            if current.tag == tag {
                if current.started {
                    log::debug!("Duplicate start for {}", tag);
                } else {
                    current.started = true;
                }
                return;
            }
        }

        let Some(preloaded) = self.preloaded.filter(|p| p.tag == tag) else {
            log::debug!("Ignoring start of stale {}", tag);
            return;
        };

        self.preloaded = None;
        if let Some(queue) = self.queue.as_mut() {
            queue.move_to(preloaded.position);
        }
        self.current = Some(Current { tag, started: true });
        self.last_trigger = Some(LoadTrigger::PlayerAdvanced);
        self.set_state(PlaybackState::Playing);
        self.publish_now_playing(LoadTrigger::PlayerAdvanced);
        self.publish_queue();
        self.progress.start_observing();
        self.preload_next().await;
    }

    async fn on_track_ended(&mut self, failed: bool) {
        // a broken track must not loop under repeat-one
        let repeat = match self.repeat_mode {
            RepeatMode::One if failed => RepeatMode::All,
            mode => mode,
        };

        match self.queue.as_ref().and_then(|q| q.peek_next(repeat)) {
            Some(position) => {
                self.load_position(position, LoadTrigger::PlayerAdvanced)
                    .await;
            }
            None => {
                log::info!("Queue finished");
                self.current = None;
                self.preloaded = None;
                self.set_state(PlaybackState::Idle);
                self.events.publish(PlaybackEvent::QueueFinished);
                if !failed {
                    self.progress.track_finished();
                }
            }
        }
    }

    /// Moves the cursor to `position`, resolves, loads and plays
    async fn load_position(&mut self, position: usize, trigger: LoadTrigger) -> bool {
        let Some((entry, previous_cursor)) = self
            .queue
            .as_ref()
            .and_then(|q| q.entry_at(position).cloned().map(|e| (e, q.cursor())))
        else {
            return false;
        };

        let previous_state = self.state;
        let can_roll_back = trigger == LoadTrigger::UserRequested
            && self.current.is_some()
            && matches!(previous_state, PlaybackState::Playing | PlaybackState::Paused);

        self.set_state(PlaybackState::Loading);
        self.preloaded = None;
        if let Some(queue) = self.queue.as_mut() {
            queue.move_to(position);
        }
        self.publish_queue();

        let tag = ItemTag::next();
        let hymn = entry.reference();
        let outcome =
            tokio::time::timeout(self.settings.load_timeout, self.resolve_and_load(hymn, tag))
                .await;

        match outcome {
            Ok(Ok(stream)) => {
                log::debug!("{} → '{}' ({})", hymn, stream.track_title, tag);
                self.current = Some(Current {
                    tag,
                    started: false,
                });
                self.last_trigger = Some(trigger);
                self.set_state(PlaybackState::Playing);
                self.publish_now_playing(trigger);
                self.progress.start_observing();
                self.preload_next().await;
                true
            }
            Ok(Err(e)) => {
                self.report(&e);
                if can_roll_back && matches!(e, PlaybackError::Resolution(_)) {
                    if let Some(queue) = self.queue.as_mut() {
                        queue.move_to(previous_cursor);
                    }
                    self.publish_queue();
                    self.set_state(previous_state);
                    self.preload_next().await;
                } else {
                    self.go_idle();
                }
                false
            }
            Err(_) => {
                self.report(&PlaybackError::Timeout(self.settings.load_timeout));
                self.go_idle();
                false
            }
        }
    }

    async fn resolve_and_load(&self, hymn: HymnRef, tag: ItemTag) -> PlaybackResult<ResolvedStream> {
        let stream = self.resolver.resolve(hymn, self.is_vocal).await?;
        let item = MediaItem::new(stream.stream_url.clone(), tag).with_duration(stream.duration_secs);
        self.context.with_player_as(self.owner, |p| {
            p.load(item)?;
            p.play()
        })??;
        Ok(stream)
    }

    /// Replaces the player's enqueued item with whatever should follow now
    async fn preload_next(&mut self) {
        self.preloaded = None;
        if self.drive(|p| p.clear_upcoming()).is_none() {
            return;
        }

        let Some((position, entry)) = self.queue.as_ref().and_then(|q| {
            q.peek_next(self.repeat_mode)
                .and_then(|pos| q.entry_at(pos).cloned().map(|e| (pos, e)))
        }) else {
            return;
        };

        let tag = ItemTag::next();
        let hymn = entry.reference();
        let resolved = tokio::time::timeout(
            self.settings.load_timeout,
            self.resolver.resolve(hymn, self.is_vocal),
        )
        .await;

        let stream = match resolved {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                log::warn!("Preload of {} failed: {}", hymn, e);
                return;
            }
            Err(_) => {
                log::warn!("Preload of {} timed out", hymn);
                return;
            }
        };

        let item = MediaItem::new(stream.stream_url, tag).with_duration(stream.duration_secs);
        match self.context.with_player_as(self.owner, |p| p.enqueue(item)) {
            Ok(Ok(())) => {
                log::debug!("Preloaded {} as {}", hymn, tag);
                self.preloaded = Some(Preloaded { tag, position });
            }
            Ok(Err(e)) | Err(e) => log::warn!("Could not enqueue {}: {}", hymn, e),
        }
    }

    fn go_idle(&mut self) {
        let _ = self.drive(|p| p.stop());
        self.progress.stop_observing();
        self.progress.reset();
        self.current = None;
        self.preloaded = None;
        self.set_state(PlaybackState::Idle);
    }

    fn drive<T>(&self, f: impl FnOnce(&mut P) -> T) -> Option<T> {
        match self.context.with_player_as(self.owner, f) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("{}: {}", self.owner, e);
                None
            }
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            log::debug!("Queue state {} → {}", self.state, state);
            self.state = state;
            self.events.publish(PlaybackEvent::StateChanged { state });
        }
    }

    fn publish_queue(&self) {
        if let Some(queue) = self.queue.as_ref() {
            self.events.publish(PlaybackEvent::QueueChanged {
                cursor: queue.cursor(),
                len: queue.len(),
                shuffled: queue.is_shuffled(),
            });
        }
    }

    fn publish_now_playing(&self, trigger: LoadTrigger) {
        if let Some(queue) = self.queue.as_ref() {
            let entry = queue.current();
            self.events.publish(PlaybackEvent::NowPlaying {
                hymn: entry.reference(),
                title: entry.title.clone(),
                vocal: self.is_vocal,
                trigger,
            });
        }
    }

    fn report(&self, error: &PlaybackError) {
        log::warn!("Playback: {}", error);
        self.events.publish(PlaybackEvent::Error {
            message: error.to_string(),
        });
    }
}
