use async_trait::async_trait;

use super::domain::{NewPlaylist, Playlist, PlaylistItem};
use super::errors::PlaylistError;

/// Persistence for playlists. Inputs are already validated by the service.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Insert the playlist and its items atomically. A taken uid yields `Conflict`.
    async fn insert(&self, playlist: NewPlaylist) -> Result<Playlist, PlaylistError>;
    async fn find(&self, org_id: i64, uid: &str) -> Result<Option<Playlist>, PlaylistError>;
    /// Items sorted by order.
    async fn items(&self, playlist_id: i64) -> Result<Vec<PlaylistItem>, PlaylistError>;
    /// Overwrite name, interval and items atomically; `None` when the playlist is absent.
    async fn replace(&self, playlist: NewPlaylist) -> Result<Option<(Playlist, Vec<PlaylistItem>)>, PlaylistError>;
    /// Remove the playlist and its items; `false` when it was absent.
    async fn delete(&self, org_id: i64, uid: &str) -> Result<bool, PlaylistError>;
    /// Playlists of an org ordered by name then id, optionally filtered by a
    /// case-insensitive name substring.
    async fn search(&self, org_id: i64, name: Option<&str>, limit: u64) -> Result<Vec<Playlist>, PlaylistError>;
}

/// In-memory store for tests and doc examples
pub mod memory {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct State {
        next_id: i64,
        playlists: BTreeMap<i64, Playlist>,
        items: HashMap<i64, Vec<PlaylistItem>>, // key: playlist_id
    }

    impl State {
        fn next_id(&mut self) -> i64 {
            self.next_id += 1;
            self.next_id
        }

        fn find_id(&self, org_id: i64, uid: &str) -> Option<i64> {
            self.playlists.values().find(|p| p.org_id == org_id && p.uid == uid).map(|p| p.id)
        }

        fn write_items(&mut self, playlist_id: i64, new: &NewPlaylist) -> Vec<PlaylistItem> {
            let items: Vec<PlaylistItem> = new
                .items
                .iter()
                .map(|i| PlaylistItem {
                    id: self.next_id(),
                    playlist_id,
                    item_type: i.item_type,
                    value: i.value.clone(),
                    title: i.title.clone(),
                    order: i.order,
                })
                .collect();
            self.items.insert(playlist_id, items.clone());
            items
        }
    }

    #[derive(Default)]
    pub struct MemoryPlaylistStore {
        state: Mutex<State>,
    }

    impl MemoryPlaylistStore {
        fn lock(&self) -> Result<MutexGuard<'_, State>, PlaylistError> {
            self.state.lock().map_err(|_| PlaylistError::Repository("memory store lock poisoned".into()))
        }
    }

    #[async_trait]
    impl PlaylistStore for MemoryPlaylistStore {
        async fn insert(&self, new: NewPlaylist) -> Result<Playlist, PlaylistError> {
            let mut state = self.lock()?;
            if state.find_id(new.org_id, &new.uid).is_some() {
                return Err(PlaylistError::Conflict(format!("uid '{}' is taken", new.uid)));
            }
            let playlist = Playlist {
                id: state.next_id(),
                uid: new.uid.clone(),
                name: new.name.clone(),
                interval: new.interval.clone(),
                org_id: new.org_id,
            };
            state.playlists.insert(playlist.id, playlist.clone());
            state.write_items(playlist.id, &new);
            Ok(playlist)
        }

        async fn find(&self, org_id: i64, uid: &str) -> Result<Option<Playlist>, PlaylistError> {
            let state = self.lock()?;
            Ok(state.find_id(org_id, uid).and_then(|id| state.playlists.get(&id).cloned()))
        }

        async fn items(&self, playlist_id: i64) -> Result<Vec<PlaylistItem>, PlaylistError> {
            let state = self.lock()?;
            let mut items = state.items.get(&playlist_id).cloned().unwrap_or_default();
            items.sort_by_key(|i| (i.order, i.id));
            Ok(items)
        }

        async fn replace(&self, new: NewPlaylist) -> Result<Option<(Playlist, Vec<PlaylistItem>)>, PlaylistError> {
            let mut state = self.lock()?;
            let Some(id) = state.find_id(new.org_id, &new.uid) else {
                return Ok(None);
            };
            let items = state.write_items(id, &new);
            let Some(playlist) = state.playlists.get_mut(&id) else {
                return Ok(None);
            };
            playlist.name = new.name;
            playlist.interval = new.interval;
            Ok(Some((playlist.clone(), items)))
        }

        async fn delete(&self, org_id: i64, uid: &str) -> Result<bool, PlaylistError> {
            let mut state = self.lock()?;
            let Some(id) = state.find_id(org_id, uid) else {
                return Ok(false);
            };
            state.playlists.remove(&id);
            state.items.remove(&id);
            Ok(true)
        }

        async fn search(&self, org_id: i64, name: Option<&str>, limit: u64) -> Result<Vec<Playlist>, PlaylistError> {
            let state = self.lock()?;
            let needle = name.map(str::to_ascii_lowercase);
            let mut found: Vec<Playlist> = state
                .playlists
                .values()
                .filter(|p| p.org_id == org_id)
                .filter(|p| needle.as_deref().map_or(true, |n| p.name.to_ascii_lowercase().contains(n)))
                .cloned()
                .collect();
            found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            found.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(found)
        }
    }
}
