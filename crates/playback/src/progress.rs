// crates/playback/src/progress.rs
//! Playback progress sampling
//!
//! `ProgressTracker` holds the published numbers and the rules for updating
//! them. `ProgressObserver` samples the player on a timer and feeds the
//! tracker.

use crate::context::{ContextTag, PlaybackContext};
use crate::player::MediaPlayer;
use hymnal_core::format_clock;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What listeners see
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub elapsed_secs: f64,
    pub duration_secs: f64,
    /// Always within 0.0..=1.0
    pub progress: f64,
    /// `m:ss`
    pub elapsed_label: String,
    /// `-m:ss`
    pub remaining_label: String,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            elapsed_secs: 0.0,
            duration_secs: 0.0,
            progress: 0.0,
            elapsed_label: format_clock(0.0),
            remaining_label: format!("-{}", format_clock(0.0)),
        }
    }
}

/// Progress state for the current item
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    elapsed: f64,
    duration: f64,
    progress: f64,
    dragging: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a sample from the player; returns true if anything changed
    ///
    /// Samples taken while a seek is in flight, with a non-positive or
    /// non-finite duration, or with a non-finite position are dropped.
    pub fn sample(&mut self, elapsed: f64, duration: f64) -> bool {
        if self.dragging || !elapsed.is_finite() || !duration.is_finite() || duration <= 0.0 {
            return false;
        }

        let elapsed = elapsed.clamp(0.0, duration);
        let progress = (elapsed / duration).clamp(0.0, 1.0);
        let changed = elapsed != self.elapsed || duration != self.duration;

        self.elapsed = elapsed;
        self.duration = duration;
        self.progress = progress;
        changed
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Moves to `fraction` of the item; returns the target in seconds
    ///
    /// Returns `None` while the duration is unknown.
    pub fn seek(&mut self, fraction: f64) -> Option<f64> {
        if self.duration <= 0.0 || !fraction.is_finite() {
            return None;
        }
        self.progress = fraction.clamp(0.0, 1.0);
        self.elapsed = self.progress * self.duration;
        Some(self.elapsed)
    }

    /// Snaps to the end of the item
    pub fn mark_finished(&mut self) {
        self.progress = 1.0;
        self.elapsed = self.duration;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            elapsed_secs: self.elapsed,
            duration_secs: self.duration,
            progress: self.progress,
            elapsed_label: format_clock(self.elapsed),
            remaining_label: format!("-{}", format_clock(self.duration - self.elapsed)),
        }
    }
}

/// Timer settings for the observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSettings {
    pub interval: Duration,
    pub end_reset_delay: Duration,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(16),
            end_reset_delay: Duration::from_millis(500),
        }
    }
}

fn lock(tracker: &Mutex<ProgressTracker>) -> MutexGuard<'_, ProgressTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Samples the player through the context while a controller owns it
pub struct ProgressObserver<P> {
    context: PlaybackContext<P>,
    owner: ContextTag,
    settings: ProgressSettings,
    tracker: Arc<Mutex<ProgressTracker>>,
    publisher: Arc<watch::Sender<ProgressSnapshot>>,
    sampler: Option<JoinHandle<()>>,
    pending_reset: Option<JoinHandle<()>>,
}

impl<P: MediaPlayer + 'static> ProgressObserver<P> {
    pub fn new(context: PlaybackContext<P>, owner: ContextTag, settings: ProgressSettings) -> Self {
        let (publisher, _) = watch::channel(ProgressSnapshot::default());
        Self {
            context,
            owner,
            settings,
            tracker: Arc::new(Mutex::new(ProgressTracker::new())),
            publisher: Arc::new(publisher),
            sampler: None,
            pending_reset: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        lock(&self.tracker).snapshot()
    }

    pub fn is_observing(&self) -> bool {
        self.sampler.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Starts sampling from zero for a newly started item
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_observing(&mut self) {
        self.stop_observing();
        if let Some(handle) = self.pending_reset.take() {
            handle.abort();
        }
        self.reset();

        let context = self.context.clone();
        let owner = self.owner;
        let tracker = Arc::clone(&self.tracker);
        let publisher = Arc::clone(&self.publisher);
        let interval = self.settings.interval;

        self.sampler = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let sample =
                    context.with_player_as(owner, |p| (p.position_secs(), p.duration_secs()));
                let Ok((elapsed, duration)) = sample else {
                    log::debug!("{} lost the player, sampling stops", owner);
                    break;
                };
                let snapshot = {
                    let mut tracker = lock(&tracker);
                    tracker
                        .sample(elapsed, duration)
                        .then(|| tracker.snapshot())
                };
                if let Some(snapshot) = snapshot {
                    publisher.send_replace(snapshot);
                }
            }
        }));
    }

    pub fn stop_observing(&mut self) {
        if let Some(handle) = self.sampler.take() {
            handle.abort();
        }
    }

    /// Seeks the player to `fraction` of the current item
    pub fn seek(&mut self, fraction: f64) {
        let target = {
            let mut tracker = lock(&self.tracker);
            tracker.begin_drag();
            tracker.seek(fraction)
        };

        if let Some(secs) = target {
            match self.context.with_player_as(self.owner, |p| p.seek(secs)) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!("Seek to {:.1}s failed: {}", secs, e),
                Err(e) => log::debug!("Seek ignored: {}", e),
            }
        }

        let snapshot = {
            let mut tracker = lock(&self.tracker);
            tracker.end_drag();
            tracker.snapshot()
        };
        self.publisher.send_replace(snapshot);
    }

    pub fn begin_drag(&self) {
        lock(&self.tracker).begin_drag();
    }

    pub fn end_drag(&self) {
        lock(&self.tracker).end_drag();
    }

    /// Clears every published field
    pub fn reset(&self) {
        lock(&self.tracker).reset();
        self.publisher.send_replace(ProgressSnapshot::default());
    }

    /// Handles the end of the last item
    ///
    /// Progress snaps to 1.0; after the configured delay the player is
    /// stopped and the fields reset, unless a new item starts first.
    pub fn track_finished(&mut self) {
        self.stop_observing();
        let snapshot = {
            let mut tracker = lock(&self.tracker);
            tracker.mark_finished();
            tracker.snapshot()
        };
        self.publisher.send_replace(snapshot);

        if let Some(handle) = self.pending_reset.take() {
            handle.abort();
        }

        let context = self.context.clone();
        let owner = self.owner;
        let tracker = Arc::clone(&self.tracker);
        let publisher = Arc::clone(&self.publisher);
        let delay = self.settings.end_reset_delay;

        self.pending_reset = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if context.with_player_as(owner, |p| p.stop()).is_err() {
                log::debug!("{} no longer owns the player, skipping stop", owner);
            }
            lock(&tracker).reset();
            publisher.send_replace(ProgressSnapshot::default());
        }));
    }

    /// Handles a playback error: logged, fields reset
    pub fn track_failed(&mut self, message: &str) {
        log::warn!("Playback error: {}", message);
        self.stop_observing();
        self.reset();
    }
}

impl<P> Drop for ProgressObserver<P> {
    fn drop(&mut self) {
        if let Some(handle) = self.sampler.take() {
            handle.abort();
        }
        if let Some(handle) = self.pending_reset.take() {
            handle.abort();
        }
    }
}
