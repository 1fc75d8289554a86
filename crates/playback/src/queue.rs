// crates/playback/src/queue.rs
//! Play order over a playlist's entries

use crate::error::{PlaybackError, PlaybackResult};
use hymnal_core::{EntryId, PlaylistEntry, RepeatMode};
use rand::seq::SliceRandom;
use rand::Rng;

/// Entries plus the order they play in and a cursor into that order
///
/// `order` holds indices into `entries`. Positions handed out by this type
/// are positions in play order.
#[derive(Debug, Clone)]
pub struct PlaybackQueue {
    entries: Vec<PlaylistEntry>,
    order: Vec<usize>,
    cursor: usize,
    shuffled: bool,
}

impl PlaybackQueue {
    /// Builds a queue starting at `start` (an index into `entries`)
    ///
    /// When shuffled, the start entry is placed first.
    pub fn new<R: Rng + ?Sized>(
        entries: Vec<PlaylistEntry>,
        start: usize,
        shuffled: bool,
        rng: &mut R,
    ) -> PlaybackResult<Self> {
        if entries.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }
        if start >= entries.len() {
            return Err(PlaybackError::StartOutOfRange {
                index: start,
                len: entries.len(),
            });
        }

        let mut queue = Self {
            order: (0..entries.len()).collect(),
            entries,
            cursor: start,
            shuffled: false,
        };
        if shuffled {
            queue.set_shuffled(true, rng);
        }
        Ok(queue)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Position of the current entry in play order
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &PlaylistEntry {
        &self.entries[self.order[self.cursor]]
    }

    /// Entry at a play-order position
    pub fn entry_at(&self, position: usize) -> Option<&PlaylistEntry> {
        self.order.get(position).map(|&i| &self.entries[i])
    }

    /// Entries in play order
    pub fn iter(&self) -> impl Iterator<Item = &PlaylistEntry> {
        self.order.iter().map(|&i| &self.entries[i])
    }

    pub fn position_of(&self, entry_id: EntryId) -> Option<usize> {
        self.order
            .iter()
            .position(|&i| self.entries[i].id == entry_id)
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.order.len()
    }

    /// Position after the cursor, wrapping to the start
    pub fn next_position(&self) -> usize {
        (self.cursor + 1) % self.order.len()
    }

    /// Position before the cursor, wrapping to the end
    pub fn previous_position(&self) -> usize {
        (self.cursor + self.order.len() - 1) % self.order.len()
    }

    /// What should follow the current entry under `repeat`
    pub fn peek_next(&self, repeat: RepeatMode) -> Option<usize> {
        match repeat {
            RepeatMode::One => Some(self.cursor),
            RepeatMode::All => Some(self.next_position()),
            RepeatMode::Off if self.is_last() => None,
            RepeatMode::Off => Some(self.cursor + 1),
        }
    }

    /// Moves the cursor; positions past the end are ignored
    pub fn move_to(&mut self, position: usize) -> bool {
        if position < self.order.len() {
            self.cursor = position;
            true
        } else {
            false
        }
    }

    /// Switches between shuffled and original order, keeping the current entry
    ///
    /// The current entry is found again by id; when shuffling it moves to
    /// the front.
    pub fn set_shuffled<R: Rng + ?Sized>(&mut self, shuffled: bool, rng: &mut R) {
        let current = self.current().id;

        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        if shuffled {
            order.shuffle(rng);
            if let Some(i) = order.iter().position(|&e| self.entries[e].id == current) {
                order.swap(0, i);
            }
        }
        self.order = order;
        self.shuffled = shuffled;
        self.cursor = self.position_of(current).unwrap_or(0);
    }
}
