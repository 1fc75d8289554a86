//! Domain types for the hymnal
//!
//! - `hymn`: hymns, editions and resolver references
//! - `playlist`: playlists and their entries
//! - `playback`: repeat mode and the live playback session
//! - `common`: timestamps and shared helpers

mod common;
mod hymn;
mod playback;
mod playlist;

pub use common::{format_clock, Timestamp, Validator};
pub use hymn::{hymn_key, Hymn, HymnRef, HymnalVersion};
pub use playback::{PlaybackSession, RepeatMode};
pub use playlist::{EntryId, Playlist, PlaylistEntry, PlaylistId, PlaylistKind};
