use tokio::sync::watch;

use super::service::{WatchlistChange, WatchlistService};
use crate::models::{WatchlistData, WatchlistItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistSnapshot {
    pub items: Vec<WatchlistItem>,
    pub count: usize,
}

impl From<&WatchlistData> for WatchlistSnapshot {
    fn from(data: &WatchlistData) -> Self {
        Self {
            items: data.items.clone(),
            count: data.items.len(),
        }
    }
}

/// Observable view over [`WatchlistService`]. Every action republishes the
/// document the service hands back.
pub struct WatchlistStore {
    service: WatchlistService,
    state: watch::Sender<WatchlistSnapshot>,
}

impl WatchlistStore {
    pub fn new(service: WatchlistService) -> Self {
        let initial = WatchlistSnapshot::from(&service.load());
        let (state, _) = watch::channel(initial);
        Self { service, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchlistSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WatchlistSnapshot {
        self.state.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.state.borrow().count
    }

    pub fn is_in_watchlist(&self, movie_id: i64) -> bool {
        self.state
            .borrow()
            .items
            .iter()
            .any(|i| i.movie_id == movie_id)
    }

    pub fn add(&self, movie_id: i64) -> bool {
        let change = self.service.add(movie_id);
        self.publish(&change)
    }

    pub fn remove(&self, movie_id: i64) -> bool {
        let change = self.service.remove(movie_id);
        self.publish(&change)
    }

    /// Adds or removes depending on membership; returns whether the movie is
    /// in the watchlist afterwards.
    pub fn toggle(&self, movie_id: i64) -> bool {
        if self.service.has(movie_id) {
            self.remove(movie_id);
        } else {
            self.add(movie_id);
        }
        self.is_in_watchlist(movie_id)
    }

    pub fn clear(&self) {
        let change = self.service.clear();
        self.publish(&change);
    }

    fn publish(&self, change: &WatchlistChange) -> bool {
        let next = WatchlistSnapshot::from(&change.data);
        self.state.send_if_modified(|s| {
            if *s == next {
                return false;
            }
            *s = next;
            true
        });
        change.changed
    }
}
