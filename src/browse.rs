use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::models::Movie;
use crate::repository::{Catalog, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub category: Option<Category>,
    pub phase: Phase,
    pub movies: Vec<Movie>,
    pub error: Option<LoadError>,
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}

/// Home feed row for one category. Single-shot, first page only.
pub struct CategoryFeed {
    catalog: Arc<dyn Catalog>,
    state: watch::Sender<FeedState>,
}

impl CategoryFeed {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self { catalog, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Loads `category` unless it is already the one shown.
    pub async fn set_category(&self, category: Category) {
        let unchanged = {
            let s = self.state.borrow();
            s.category == Some(category) && s.phase != Phase::Idle
        };
        if unchanged {
            return;
        }
        self.fetch(category).await;
    }

    pub async fn reload(&self) {
        let current = self.state.borrow().category;
        if let Some(category) = current {
            self.fetch(category).await;
        }
    }

    async fn fetch(&self, category: Category) {
        self.state.send_modify(|s| {
            s.category = Some(category);
            s.phase = Phase::Loading;
            s.error = None;
        });

        let result = self.catalog.category(category, 1).await;

        self.state.send_modify(|s| match result {
            Ok(list) => {
                info!("Loaded {} movies for {}", list.movies.len(), category);
                s.movies = list.movies;
                s.phase = Phase::Success;
            }
            Err(err) => {
                warn!("Failed to load {}: {}", category, err);
                s.movies.clear();
                s.error = Some(LoadError::from(&err));
                s.phase = Phase::Error;
            }
        });
    }
}
