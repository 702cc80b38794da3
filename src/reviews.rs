use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::models::{Review, ReviewList};
use crate::repository::Catalog;

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewsState {
    pub movie_id: i64,
    pub reviews: Vec<Review>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub loading: bool,
    pub error: Option<LoadError>,
    /// Bumped on every reset so late pages from an earlier owner are dropped.
    generation: u64,
}

impl ReviewsState {
    fn seeded(movie_id: i64, seed: ReviewList) -> Self {
        Self {
            movie_id,
            reviews: seed.reviews,
            page: seed.page,
            total_pages: seed.total_pages,
            total_results: seed.total_results,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Pages through a movie's reviews, starting from the page embedded in the
/// detail response.
pub struct ReviewsPager {
    catalog: Arc<dyn Catalog>,
    state: watch::Sender<ReviewsState>,
}

impl ReviewsPager {
    pub fn new(catalog: Arc<dyn Catalog>, movie_id: i64, seed: ReviewList) -> Self {
        let (state, _) = watch::channel(ReviewsState::seeded(movie_id, seed));
        Self { catalog, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ReviewsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ReviewsState {
        self.state.borrow().clone()
    }

    /// Starts over for a different movie. Returns false when `movie_id` is
    /// already the owner.
    pub fn reset(&self, movie_id: i64, seed: ReviewList) -> bool {
        self.state.send_if_modified(|s| {
            if s.movie_id == movie_id {
                return false;
            }
            let generation = s.generation + 1;
            *s = ReviewsState::seeded(movie_id, seed);
            s.generation = generation;
            true
        })
    }

    /// Fetches and appends the next page. Returns whether a fetch ran.
    pub async fn load_more(&self) -> bool {
        let mut next = None;
        self.state.send_if_modified(|s| {
            if s.loading || !s.has_more() {
                return false;
            }
            s.loading = true;
            s.error = None;
            next = Some((s.movie_id, s.page + 1, s.generation));
            true
        });
        let Some((movie_id, page, generation)) = next else {
            return false;
        };

        let result = self.catalog.reviews(movie_id, page).await;

        self.state.send_if_modified(|s| {
            if s.generation != generation {
                debug!(movie_id, page, "Dropping reviews loaded before a reset");
                return false;
            }
            match result {
                Ok(list) => {
                    let mut seen: HashSet<String> =
                        s.reviews.iter().map(|r| r.id.clone()).collect();
                    s.reviews
                        .extend(list.reviews.into_iter().filter(|r| seen.insert(r.id.clone())));
                    s.page = list.page;
                    s.total_pages = list.total_pages;
                    s.total_results = list.total_results;
                }
                Err(err) => {
                    warn!(movie_id, page, "Failed to load reviews: {}", err);
                    s.error = Some(LoadError::from(&err));
                }
            }
            s.loading = false;
            true
        });
        true
    }
}
