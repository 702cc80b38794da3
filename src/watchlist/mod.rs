mod service;
mod storage;
mod store;

pub use service::{WatchlistChange, WatchlistService, WATCHLIST_KEY};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{WatchlistSnapshot, WatchlistStore};
