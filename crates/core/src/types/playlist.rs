//! Playlist domain models

use crate::error::{AppError, Result};
use crate::types::{Hymn, HymnalVersion, Timestamp, Validator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistId(Uuid);

impl PlaylistId {
    /// Creates a new random PlaylistId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PlaylistId from a UUID string
    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the PlaylistId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }

    /// Fixed id of the full-hymnal playlist for an edition
    pub fn full_hymnal(version: HymnalVersion) -> Self {
        Self(Uuid::from_u128(0x1000 + version_slot(version)))
    }

    /// Fixed id of the favorites playlist
    pub fn favorites() -> Self {
        Self(Uuid::from_u128(0x2000))
    }
}

impl Default for PlaylistId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an entry within a playlist
///
/// Identity survives reordering; queues re-locate entries by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Deterministic id for entries of derived playlists, so rebuilding a
    /// system playlist yields the same identities
    pub fn derived(version: HymnalVersion, numeric_id: u32) -> Self {
        Self(Uuid::from_u128(
            ((version_slot(version) + 1) << 64) | numeric_id as u128,
        ))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn version_slot(version: HymnalVersion) -> u128 {
    match version {
        HymnalVersion::Standard => 0,
        HymnalVersion::Revised => 1,
    }
}

/// Kind of playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistKind {
    /// Created and edited by the user
    User,
    /// Every hymn of one edition, derived
    FullHymnal,
    /// The user's favorites, derived
    Favorites,
}

/// A hymn placed in a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: EntryId,
    pub hymn_id: String,
    pub title: String,
    pub numeric_id: u32,
    pub hymnal_version: HymnalVersion,
    pub added_at: Timestamp,
}

impl PlaylistEntry {
    /// Creates a fresh entry for a hymn
    pub fn new(hymn: &Hymn) -> Self {
        Self {
            id: EntryId::new(),
            hymn_id: hymn.key(),
            title: hymn.title.clone(),
            numeric_id: hymn.numeric_id,
            hymnal_version: hymn.hymnal_version,
            added_at: Timestamp::now(),
        }
    }

    /// Creates an entry with a deterministic id for derived playlists
    pub fn derived(hymn: &Hymn, added_at: Timestamp) -> Self {
        Self {
            id: EntryId::derived(hymn.hymnal_version, hymn.numeric_id),
            hymn_id: hymn.key(),
            title: hymn.title.clone(),
            numeric_id: hymn.numeric_id,
            hymnal_version: hymn.hymnal_version,
            added_at,
        }
    }

    /// Zero-based index of the hymn within its edition
    pub fn sequence_index(&self) -> usize {
        self.numeric_id.saturating_sub(1) as usize
    }

    pub fn reference(&self) -> crate::types::HymnRef {
        crate::types::HymnRef::from_number(self.hymnal_version, self.numeric_id)
    }
}

/// An ordered collection of hymns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub description: Option<String>,
    pub entries: Vec<PlaylistEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub kind: PlaylistKind,
}

impl Playlist {
    /// Creates a new, empty user playlist
    pub fn new_user(name: String) -> Self {
        let now = Timestamp::now();
        Self {
            id: PlaylistId::new(),
            name,
            description: None,
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
            kind: PlaylistKind::User,
        }
    }

    /// Creates a system-managed playlist from pre-built entries
    pub fn new_system(
        id: PlaylistId,
        name: String,
        kind: PlaylistKind,
        entries: Vec<PlaylistEntry>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            name,
            description: None,
            entries,
            created_at: now,
            updated_at: now,
            kind,
        }
    }

    /// System playlists are derived by the app and read-only to the user
    pub fn is_system_managed(&self) -> bool {
        self.kind != PlaylistKind::User
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_hymn(&self, hymn_id: &str) -> bool {
        self.entries.iter().any(|e| e.hymn_id == hymn_id)
    }

    pub fn position_of(&self, entry_id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == entry_id)
    }

    pub fn set_name(&mut self, name: String) -> Result<()> {
        self.ensure_mutable()?;
        if name.trim().is_empty() {
            return Err(AppError::invalid_argument("name", "must not be empty"));
        }
        self.name = name;
        self.touch();
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) -> Result<()> {
        self.ensure_mutable()?;
        self.description = description;
        self.touch();
        Ok(())
    }

    /// Appends a hymn; returns false if the hymn is already present
    pub fn push_hymn(&mut self, hymn: &Hymn) -> Result<bool> {
        self.ensure_mutable()?;
        if self.contains_hymn(&hymn.key()) {
            return Ok(false);
        }
        self.entries.push(PlaylistEntry::new(hymn));
        self.touch();
        Ok(true)
    }

    pub fn remove_entry(&mut self, entry_id: EntryId) -> Result<PlaylistEntry> {
        self.ensure_mutable()?;
        let position = self.position_of(entry_id).ok_or_else(|| AppError::EntryNotFound {
            playlist: self.id.to_string(),
            entry: entry_id.to_string(),
        })?;
        let removed = self.entries.remove(position);
        self.touch();
        Ok(removed)
    }

    /// Moves the entry at `from` so that it ends up at `to`
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_mutable()?;
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(AppError::invalid_argument(
                "position",
                format!("{} -> {} outside 0..{}", from, to, len),
            ));
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.touch();
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.is_system_managed() {
            Err(AppError::ReadOnlyPlaylist {
                name: self.name.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

impl Validator for Playlist {
    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Playlist name cannot be empty".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.id) {
                errors.push(format!("Duplicate entry id {}", entry.id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
