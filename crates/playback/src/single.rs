// crates/playback/src/single.rs
//! One hymn at a time, no queue

use crate::context::{ContextTag, PlaybackContext};
use crate::coordinator::ControllerSettings;
use crate::error::{PlaybackError, PlaybackResult};
use crate::events::{EventBus, LoadTrigger, PlaybackEvent, PlaybackState};
use crate::player::{ItemTag, MediaItem, MediaPlayer, PlayerEvent};
use crate::progress::{ProgressObserver, ProgressSnapshot};
use hymnal_core::{Hymn, HymnRef};
use hymnal_network::TrackResolver;
use tokio::sync::{broadcast, watch};

/// Plays a single hymn, switching between its vocal and instrumental takes
pub struct SingleTrackController<P, R> {
    owner: ContextTag,
    context: PlaybackContext<P>,
    resolver: R,
    settings: ControllerSettings,
    state: PlaybackState,
    hymn: Option<Hymn>,
    is_vocal: bool,
    current: Option<ItemTag>,
    events: EventBus,
    progress: ProgressObserver<P>,
}

impl<P: MediaPlayer + 'static, R: TrackResolver> SingleTrackController<P, R> {
    pub fn new(context: PlaybackContext<P>, resolver: R, settings: ControllerSettings) -> Self {
        let owner = ContextTag::next();
        Self {
            owner,
            progress: ProgressObserver::new(context.clone(), owner, settings.progress),
            context,
            resolver,
            settings,
            state: PlaybackState::Idle,
            hymn: None,
            is_vocal: settings.prefer_vocal,
            current: None,
            events: EventBus::new(),
        }
    }

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

    pub fn hymn(&self) -> Option<&Hymn> {
        self.hymn.as_ref()
    }

    pub fn is_vocal(&self) -> bool {
        self.is_vocal
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    pub fn progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.subscribe()
    }

    pub fn seek(&mut self, fraction: f64) {
        if self.current.is_some() {
            self.progress.seek(fraction);
        }
    }

    /// Claims the player and starts `hymn`
    pub async fn play(&mut self, hymn: &Hymn, vocal: bool) -> PlaybackResult<()> {
        self.context.claim(self.owner);
        self.hymn = Some(hymn.clone());
        self.is_vocal = vocal;
        self.load_current().await
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing
            && self.context.with_player_as(self.owner, |p| p.pause()).is_ok()
        {
            self.set_state(PlaybackState::Paused);
        }
    }

    pub fn resume(&mut self) -> PlaybackResult<()> {
        if self.state != PlaybackState::Paused {
            return Ok(());
        }
        self.context.with_player_as(self.owner, |p| p.play())??;
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    pub fn stop(&mut self) {
        let _ = self.context.with_player_as(self.owner, |p| p.stop());
        self.progress.stop_observing();
        self.progress.reset();
        self.current = None;
        self.set_state(PlaybackState::Idle);
    }

    /// Stops and reloads the other take of the same hymn
    pub async fn toggle_vocal_instrumental(&mut self) -> PlaybackResult<()> {
        if self.hymn.is_none() {
            return Err(PlaybackError::NothingLoaded);
        }
        self.is_vocal = !self.is_vocal;
        self.stop();
        self.load_current().await
    }

    pub fn pump_player_events(&mut self) -> usize {
        let events = self.context.with_player(|p| p.poll_events());
        let count = events.len();
        for event in events {
            self.handle_player_event(event);
        }
        count
    }

    pub fn handle_player_event(&mut self, event: PlayerEvent) {
        if self.current != Some(event.tag()) {
            return;
        }
        match event {
            PlayerEvent::ItemStarted { .. } => {}
            PlayerEvent::ReachedEnd { .. } => {
                self.current = None;
                self.progress.track_finished();
                self.set_state(PlaybackState::Idle);
            }
            PlayerEvent::Failed { message, .. } => {
                self.current = None;
                self.progress.track_failed(&message);
                self.events.publish(PlaybackEvent::Error { message });
                self.set_state(PlaybackState::Idle);
            }
        }
    }

    async fn load_current(&mut self) -> PlaybackResult<()> {
        let Some(hymn) = self.hymn.clone() else {
            return Err(PlaybackError::NothingLoaded);
        };
        let reference = hymn.reference();
        let tag = ItemTag::next();
        self.set_state(PlaybackState::Loading);

        let load = self.resolve_and_load(reference, tag);
        let result = match tokio::time::timeout(self.settings.load_timeout, load).await {
            Ok(result) => result,
            Err(_) => Err(PlaybackError::Timeout(self.settings.load_timeout)),
        };

        match result {
            Ok(()) => {
                self.current = Some(tag);
                self.set_state(PlaybackState::Playing);
                self.events.publish(PlaybackEvent::NowPlaying {
                    hymn: reference,
                    title: hymn.title.clone(),
                    vocal: self.is_vocal,
                    trigger: LoadTrigger::UserRequested,
                });
                self.progress.start_observing();
                Ok(())
            }
            Err(e) => {
                log::warn!("Could not play {}: {}", reference, e);
                self.events.publish(PlaybackEvent::Error {
                    message: e.to_string(),
                });
                self.current = None;
                self.set_state(PlaybackState::Idle);
                Err(e)
            }
        }
    }

    async fn resolve_and_load(&self, reference: HymnRef, tag: ItemTag) -> PlaybackResult<()> {
        let stream = self.resolver.resolve(reference, self.is_vocal).await?;
        let item = MediaItem::new(stream.stream_url, tag).with_duration(stream.duration_secs);
        self.context.with_player_as(self.owner, |p| {
            p.load(item)?;
            p.play()
        })?
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            log::debug!("Single-track state {} → {}", self.state, state);
            self.state = state;
            self.events.publish(PlaybackEvent::StateChanged { state });
        }
    }
}
