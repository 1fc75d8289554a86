//! Hymnal core: domain types, errors, the playlist library and its storage

pub mod error;
pub mod library;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use library::{Favorite, PlaylistLibrary};
pub use store::{write_atomic, FileStore, KeyValueStore, MemoryStore};
pub use types::{
    format_clock, hymn_key, EntryId, Hymn, HymnRef, HymnalVersion, PlaybackSession, Playlist,
    PlaylistEntry, PlaylistId, PlaylistKind, RepeatMode, Timestamp, Validator,
};
