// crates/playback/src/context.rs
//! Shared handle to the one media player

use crate::error::{PlaybackError, PlaybackResult};
use crate::player::MediaPlayer;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NEXT_CONTEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Identifies a controller that may own the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextTag(u64);

impl ContextTag {
    pub fn next() -> Self {
        Self(NEXT_CONTEXT_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context#{}", self.0)
    }
}

struct Inner<P> {
    player: P,
    owner: Option<ContextTag>,
}

/// Cloneable handle to the player plus the tag of its current owner
///
/// Only one controller drives the player at a time. Claiming for a new
/// owner stops whatever the previous owner was playing.
pub struct PlaybackContext<P> {
    inner: Arc<Mutex<Inner<P>>>,
}

impl<P> Clone for PlaybackContext<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: MediaPlayer> PlaybackContext<P> {
    pub fn new(player: P) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                player,
                owner: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `tag` the owner; returns true if ownership changed hands
    pub fn claim(&self, tag: ContextTag) -> bool {
        let mut inner = self.lock();
        match inner.owner {
            Some(owner) if owner == tag => false,
            previous => {
                if let Some(previous) = previous {
                    log::debug!("{} takes the player from {}", tag, previous);
                    inner.player.stop();
                }
                inner.owner = Some(tag);
                true
            }
        }
    }

    /// Gives the player up if `tag` owns it
    pub fn release(&self, tag: ContextTag) {
        let mut inner = self.lock();
        if inner.owner == Some(tag) {
            inner.owner = None;
        }
    }

    pub fn owner(&self) -> Option<ContextTag> {
        self.lock().owner
    }

    pub fn is_owned_by(&self, tag: ContextTag) -> bool {
        self.owner() == Some(tag)
    }

    /// Runs `f` on the player regardless of owner
    pub fn with_player<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.lock().player)
    }

    /// Runs `f` on the player if `tag` still owns it
    pub fn with_player_as<R>(
        &self,
        tag: ContextTag,
        f: impl FnOnce(&mut P) -> R,
    ) -> PlaybackResult<R> {
        let mut inner = self.lock();
        if inner.owner != Some(tag) {
            return Err(PlaybackError::ContextLost);
        }
        Ok(f(&mut inner.player))
    }
}
