//! User playlists and favorites
//!
//! The library owns the mutable user state. System playlists (the full
//! hymnal of an edition, and favorites) are derived on demand from the hymn
//! catalogue and are never stored.

use crate::error::{AppError, Result};
use crate::store::KeyValueStore;
use crate::types::{
    EntryId, Hymn, HymnalVersion, Playlist, PlaylistEntry, PlaylistId, PlaylistKind, Timestamp,
    Validator,
};
use serde::{Deserialize, Serialize};

/// Store key holding the JSON array of user playlists
pub const USER_PLAYLISTS_KEY: &str = "hymnal.user_playlists";

/// Store key holding the JSON array of favorites
pub const FAVORITES_KEY: &str = "hymnal.favorites";

/// A hymn the user marked as favorite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub hymn_id: String,
    pub favorited_at: Timestamp,
}

/// The user's playlists and favorites
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistLibrary {
    playlists: Vec<Playlist>,
    favorites: Vec<Favorite>,
}

impl PlaylistLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the library from a store; missing keys yield an empty library
    pub fn load(store: &impl KeyValueStore) -> Result<Self> {
        let playlists: Vec<Playlist> = read_json(store, USER_PLAYLISTS_KEY)?.unwrap_or_default();
        let favorites: Vec<Favorite> = read_json(store, FAVORITES_KEY)?.unwrap_or_default();

        for playlist in &playlists {
            if let Err(errors) = playlist.validate() {
                log::warn!("Playlist '{}' has problems: {}", playlist.name, errors.join("; "));
            }
        }

        log::debug!(
            "Loaded {} playlists and {} favorites",
            playlists.len(),
            favorites.len()
        );
        Ok(Self {
            playlists,
            favorites,
        })
    }

    /// Writes the library to a store
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<()> {
        write_json(store, USER_PLAYLISTS_KEY, &self.playlists)?;
        write_json(store, FAVORITES_KEY, &self.favorites)?;
        Ok(())
    }

    /// Every hymn of one edition, in numeric order
    pub fn full_hymnal(hymns: &[Hymn], version: HymnalVersion) -> Playlist {
        let created = Timestamp::from_millis(0);
        let mut edition: Vec<&Hymn> = hymns
            .iter()
            .filter(|h| h.hymnal_version == version)
            .collect();
        edition.sort_by_key(|h| h.numeric_id);

        Playlist::new_system(
            PlaylistId::full_hymnal(version),
            format!("Hymnal ({})", version),
            PlaylistKind::FullHymnal,
            edition
                .into_iter()
                .map(|h| PlaylistEntry::derived(h, created))
                .collect(),
        )
    }

    /// Favorites in the order they were added
    ///
    /// Favorites whose hymn is missing from the catalogue are skipped.
    pub fn favorites_playlist(&self, hymns: &[Hymn]) -> Playlist {
        let entries = self
            .favorites
            .iter()
            .filter_map(|fav| {
                hymns
                    .iter()
                    .find(|h| h.key() == fav.hymn_id)
                    .map(|h| PlaylistEntry::derived(h, fav.favorited_at))
            })
            .collect();

        Playlist::new_system(
            PlaylistId::favorites(),
            "Favorites".to_string(),
            PlaylistKind::Favorites,
            entries,
        )
    }

    pub fn user_playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn playlist(&self, id: PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    /// Finds a user playlist by case-insensitive name
    pub fn find_by_name(&self, name: &str) -> Option<&Playlist> {
        let wanted = name.trim();
        self.playlists
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(wanted))
    }

    pub fn create_playlist(&mut self, name: &str, description: Option<String>) -> Result<PlaylistId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_argument("name", "must not be empty"));
        }
        let mut playlist = Playlist::new_user(name.to_string());
        playlist.description = description;
        let id = playlist.id;
        self.playlists.push(playlist);
        log::info!("Created playlist '{}' ({})", name, id);
        Ok(id)
    }

    pub fn rename_playlist(&mut self, id: PlaylistId, name: &str) -> Result<()> {
        self.playlist_mut(id)?.set_name(name.trim().to_string())
    }

    pub fn set_description(&mut self, id: PlaylistId, description: Option<String>) -> Result<()> {
        self.playlist_mut(id)?.set_description(description)
    }

    pub fn delete_playlist(&mut self, id: PlaylistId) -> Result<Playlist> {
        ensure_not_system(id)?;
        let position = self
            .playlists
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::PlaylistNotFound { id: id.to_string() })?;
        let removed = self.playlists.remove(position);
        log::info!("Deleted playlist '{}'", removed.name);
        Ok(removed)
    }

    /// Adds a hymn to a user playlist; returns false if already present
    pub fn add_hymn(&mut self, id: PlaylistId, hymn: &Hymn) -> Result<bool> {
        self.playlist_mut(id)?.push_hymn(hymn)
    }

    pub fn remove_entry(&mut self, id: PlaylistId, entry_id: EntryId) -> Result<PlaylistEntry> {
        self.playlist_mut(id)?.remove_entry(entry_id)
    }

    pub fn move_entry(&mut self, id: PlaylistId, from: usize, to: usize) -> Result<()> {
        self.playlist_mut(id)?.move_entry(from, to)
    }

    /// Flips the favorite flag; returns true if the hymn is now a favorite
    pub fn toggle_favorite(&mut self, hymn: &Hymn) -> bool {
        let key = hymn.key();
        if let Some(position) = self.favorites.iter().position(|f| f.hymn_id == key) {
            self.favorites.remove(position);
            false
        } else {
            self.favorites.push(Favorite {
                hymn_id: key,
                favorited_at: Timestamp::now(),
            });
            true
        }
    }

    pub fn is_favorite(&self, hymn: &Hymn) -> bool {
        let key = hymn.key();
        self.favorites.iter().any(|f| f.hymn_id == key)
    }

    fn playlist_mut(&mut self, id: PlaylistId) -> Result<&mut Playlist> {
        ensure_not_system(id)?;
        self.playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::PlaylistNotFound { id: id.to_string() })
    }
}

fn ensure_not_system(id: PlaylistId) -> Result<()> {
    if id == PlaylistId::favorites() {
        return Err(AppError::ReadOnlyPlaylist {
            name: "Favorites".to_string(),
        });
    }
    if let Some(version) = HymnalVersion::ALL
        .into_iter()
        .find(|v| PlaylistId::full_hymnal(*v) == id)
    {
        return Err(AppError::ReadOnlyPlaylist {
            name: format!("Hymnal ({})", version),
        });
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| AppError::Serialization {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

fn write_json<T: Serialize>(store: &mut impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|source| AppError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn catalogue() -> Vec<Hymn> {
        vec![
            Hymn::new(2, "Second", HymnalVersion::Standard),
            Hymn::new(1, "First", HymnalVersion::Standard),
            Hymn::new(1, "Revised First", HymnalVersion::Revised),
        ]
    }

    #[test]
    fn test_full_hymnal_is_sorted_and_filtered() {
        let playlist = PlaylistLibrary::full_hymnal(&catalogue(), HymnalVersion::Standard);
        assert_eq!(playlist.kind, PlaylistKind::FullHymnal);
        assert!(playlist.is_system_managed());
        let numbers: Vec<u32> = playlist.entries.iter().map(|e| e.numeric_id).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_full_hymnal_entry_ids_are_stable() {
        let a = PlaylistLibrary::full_hymnal(&catalogue(), HymnalVersion::Standard);
        let b = PlaylistLibrary::full_hymnal(&catalogue(), HymnalVersion::Standard);
        assert_eq!(a.entries, b.entries);
    }

    #[test]
    fn test_toggle_favorite() {
        let hymns = catalogue();
        let mut library = PlaylistLibrary::new();

        assert!(library.toggle_favorite(&hymns[0]));
        assert!(library.is_favorite(&hymns[0]));
        assert!(!library.is_favorite(&hymns[2]));

        assert!(!library.toggle_favorite(&hymns[0]));
        assert!(!library.is_favorite(&hymns[0]));
    }

    #[test]
    fn test_favorites_playlist_keeps_insertion_order() {
        let hymns = catalogue();
        let mut library = PlaylistLibrary::new();
        library.toggle_favorite(&hymns[2]);
        library.toggle_favorite(&hymns[0]);

        let favorites = library.favorites_playlist(&hymns);
        let keys: Vec<&str> = favorites.entries.iter().map(|e| e.hymn_id.as_str()).collect();
        assert_eq!(keys, vec!["revised-1", "standard-2"]);
    }

    #[test]
    fn test_system_playlists_reject_mutation() {
        let hymns = catalogue();
        let mut library = PlaylistLibrary::new();

        let result = library.add_hymn(PlaylistId::favorites(), &hymns[0]);
        assert!(matches!(result, Err(AppError::ReadOnlyPlaylist { .. })));

        let result = library.delete_playlist(PlaylistId::full_hymnal(HymnalVersion::Revised));
        assert!(matches!(result, Err(AppError::ReadOnlyPlaylist { .. })));
    }

    #[test]
    fn test_create_rename_delete() {
        let mut library = PlaylistLibrary::new();
        let id = library.create_playlist("  Morning  ", None).unwrap();
        assert_eq!(library.playlist(id).unwrap().name, "Morning");
        assert!(library.find_by_name("morning").is_some());

        library.rename_playlist(id, "Evening").unwrap();
        assert_eq!(library.playlist(id).unwrap().name, "Evening");

        library.delete_playlist(id).unwrap();
        assert!(library.playlist(id).is_none());
        assert!(matches!(
            library.delete_playlist(id),
            Err(AppError::PlaylistNotFound { .. })
        ));
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let mut library = PlaylistLibrary::new();
        assert!(library.create_playlist("   ", None).is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let hymns = catalogue();
        let mut library = PlaylistLibrary::new();
        let id = library.create_playlist("Choir", Some("Practice".to_string())).unwrap();
        library.add_hymn(id, &hymns[0]).unwrap();
        library.add_hymn(id, &hymns[1]).unwrap();
        library.toggle_favorite(&hymns[2]);

        let mut store = MemoryStore::new();
        library.save(&mut store).unwrap();

        let loaded = PlaylistLibrary::load(&store).unwrap();
        assert_eq!(loaded, library);
    }

    #[test]
    fn test_load_empty_store() {
        let store = MemoryStore::new();
        let library = PlaylistLibrary::load(&store).unwrap();
        assert!(library.user_playlists().is_empty());
        assert!(library.favorites().is_empty());
    }

    #[test]
    fn test_load_corrupted_blob() {
        let mut store = MemoryStore::new();
        store.set(USER_PLAYLISTS_KEY, "{not json").unwrap();

        let result = PlaylistLibrary::load(&store);
        assert!(matches!(result, Err(AppError::Serialization { .. })));
    }
}
