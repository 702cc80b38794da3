use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::storage::KeyValueStore;
use crate::models::{WatchlistData, WatchlistItem};

pub const WATCHLIST_KEY: &str = "cinefeed:watchlist";

/// Result of a mutating call: whether anything changed, plus the document as
/// it stands afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistChange {
    pub changed: bool,
    pub data: WatchlistData,
}

/// Best-effort persistence of the watchlist document. Storage failures are
/// logged and swallowed.
pub struct WatchlistService {
    store: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl WatchlistService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, WATCHLIST_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Missing, unreadable or corrupt data all yield an empty document.
    pub fn load(&self) -> WatchlistData {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return WatchlistData::default(),
            Err(e) => {
                warn!("Failed to read watchlist: {}", e);
                return WatchlistData::default();
            }
        };
        match serde_json::from_str::<WatchlistData>(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!("Discarding corrupt watchlist data: {}", e);
                WatchlistData::default()
            }
        }
    }

    fn save(&self, data: &WatchlistData) -> bool {
        let raw = match serde_json::to_string(data) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to serialize watchlist: {}", e);
                return false;
            }
        };
        match self.store.write(&self.key, &raw) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save watchlist: {}", e);
                false
            }
        }
    }

    fn modify<F>(&self, f: F) -> WatchlistChange
    where
        F: FnOnce(&mut WatchlistData) -> bool,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut data = self.load();
        let changed = f(&mut data);
        if changed {
            self.save(&data);
        }
        WatchlistChange { changed, data }
    }

    pub fn add(&self, movie_id: i64) -> WatchlistChange {
        let change = self.modify(|data| {
            if data.items.iter().any(|i| i.movie_id == movie_id) {
                return false;
            }
            data.items.insert(
                0,
                WatchlistItem {
                    movie_id,
                    added_at: Utc::now(),
                },
            );
            true
        });
        if change.changed {
            info!(movie_id, "Added movie to watchlist");
        } else {
            debug!(movie_id, "Movie already in watchlist");
        }
        change
    }

    pub fn remove(&self, movie_id: i64) -> WatchlistChange {
        let change = self.modify(|data| {
            let before = data.items.len();
            data.items.retain(|i| i.movie_id != movie_id);
            data.items.len() != before
        });
        if change.changed {
            info!(movie_id, "Removed movie from watchlist");
        }
        change
    }

    pub fn has(&self, movie_id: i64) -> bool {
        self.load().items.iter().any(|i| i.movie_id == movie_id)
    }

    pub fn get_all(&self) -> Vec<WatchlistItem> {
        self.load().items
    }

    pub fn get_all_ids(&self) -> Vec<i64> {
        self.load().items.iter().map(|i| i.movie_id).collect()
    }

    pub fn count(&self) -> usize {
        self.load().items.len()
    }

    pub fn clear(&self) -> WatchlistChange {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let data = WatchlistData::default();
        self.save(&data);
        info!("Cleared watchlist");
        WatchlistChange {
            changed: true,
            data,
        }
    }
}
