use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{CatalogError, LoadError};
use crate::models::MovieDetail;
use crate::repository::Catalog;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub movie_id: Option<i64>,
    pub detail: Option<MovieDetail>,
    pub loading: bool,
    pub error: Option<LoadError>,
}

impl DetailState {
    fn settled_or_loading(&self) -> bool {
        self.loading || self.detail.is_some() || self.error.is_some()
    }
}

pub struct DetailLoader {
    catalog: Arc<dyn Catalog>,
    state: watch::Sender<DetailState>,
}

impl DetailLoader {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self { catalog, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    /// Points the loader at a movie. Missing or non-positive ids become a
    /// validation error without touching the network.
    pub async fn set_movie_id(&self, movie_id: Option<i64>) {
        let unchanged = {
            let s = self.state.borrow();
            s.movie_id == movie_id && s.settled_or_loading()
        };
        if unchanged {
            return;
        }
        self.load(movie_id).await;
    }

    pub async fn reload(&self) {
        let movie_id = self.state.borrow().movie_id;
        self.load(movie_id).await;
    }

    async fn load(&self, movie_id: Option<i64>) {
        let id = match movie_id {
            Some(id) if id > 0 => id,
            other => {
                debug!(movie_id = ?other, "Rejecting movie id");
                let err = CatalogError::InvalidMovieId(other.unwrap_or_default());
                self.state.send_modify(|s| {
                    s.movie_id = other;
                    s.detail = None;
                    s.loading = false;
                    s.error = Some(LoadError::from(&err));
                });
                return;
            }
        };

        self.state.send_modify(|s| {
            s.movie_id = Some(id);
            s.detail = None;
            s.loading = true;
            s.error = None;
        });

        let result = self.catalog.movie_detail(id).await;

        self.state.send_modify(|s| {
            match result {
                Ok(detail) => s.detail = Some(detail),
                Err(err) => {
                    warn!(movie_id = id, "Failed to load movie detail: {}", err);
                    s.error = Some(LoadError::from(&err));
                }
            }
            s.loading = false;
        });
    }
}
