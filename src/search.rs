use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::models::Movie;
use crate::repository::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Relevance,
    Popularity,
    Rating,
    ReleaseDate,
    Title,
}

impl SortMode {
    /// Only upstream order can be extended page by page.
    pub fn allows_pagination(&self) -> bool {
        matches!(self, SortMode::Relevance)
    }

    fn compare(&self, a: &Movie, b: &Movie) -> Ordering {
        match self {
            SortMode::Relevance => Ordering::Equal,
            SortMode::Popularity => b.popularity.total_cmp(&a.popularity),
            SortMode::Rating => b.rating.total_cmp(&a.rating),
            SortMode::ReleaseDate => b.release_date.cmp(&a.release_date),
            SortMode::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub debounced_query: String,
    /// Query the committed `movies` and page counters belong to.
    pub results_query: String,
    /// Accumulated results in upstream order.
    pub movies: Vec<Movie>,
    pub loading: bool,
    pub error: Option<LoadError>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub sort: SortMode,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            debounced_query: String::new(),
            results_query: String::new(),
            movies: Vec::new(),
            loading: false,
            error: None,
            current_page: 1,
            total_pages: 0,
            total_results: 0,
            sort: SortMode::Relevance,
        }
    }
}

impl SearchState {
    pub fn has_more(&self) -> bool {
        self.sort.allows_pagination()
            && !self.results_query.is_empty()
            && self.current_page < self.total_pages
    }

    pub fn sorted_movies(&self) -> Vec<Movie> {
        let mut movies = self.movies.clone();
        if self.sort != SortMode::Relevance {
            movies.sort_by(|a, b| self.sort.compare(a, b));
        }
        movies
    }

    fn clear_results(&mut self) {
        self.debounced_query.clear();
        self.results_query.clear();
        self.movies.clear();
        self.loading = false;
        self.error = None;
        self.current_page = 1;
        self.total_pages = 0;
        self.total_results = 0;
    }
}

/// Holds the token of the latest request; starting a new one cancels the old.
#[derive(Debug, Default)]
struct RequestSlot {
    current: Mutex<Option<CancellationToken>>,
}

impl RequestSlot {
    fn begin(&self) -> CancellationToken {
        self.install(CancellationToken::new())
    }

    fn install(&self, token: CancellationToken) -> CancellationToken {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = guard.replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    fn cancel(&self) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = guard.take() {
            previous.cancel();
        }
    }
}

pub struct SearchController {
    catalog: Arc<dyn Catalog>,
    debounce: Duration,
    state: watch::Sender<SearchState>,
    pending: RequestSlot,
    in_flight: RequestSlot,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn Catalog>, debounce: Duration) -> Arc<Self> {
        let (state, _) = watch::channel(SearchState::default());
        Arc::new(Self {
            catalog,
            debounce,
            state,
            pending: RequestSlot::default(),
            in_flight: RequestSlot::default(),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Records an edit and cancels whatever was pending or in flight. A blank
    /// query clears results right away; anything else fetches page 1 once the
    /// input has been idle for the debounce window.
    pub fn set_query(self: &Arc<Self>, query: impl Into<String>) {
        let query = query.into();
        self.cancel();
        self.state.send_modify(|s| s.query = query.clone());

        let trimmed = query.trim().to_string();
        if trimmed.is_empty() {
            self.state.send_modify(SearchState::clear_results);
            return;
        }

        let token = self.pending.begin();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(this.debounce) => {}
            }
            // cancelling the debounce also cancels the request it starts
            let request = token.child_token();
            if this.reuse_shown(&trimmed, &request) {
                debug!(query = %trimmed, "Results already shown, skipping fetch");
                return;
            }
            this.fetch_first_page(trimmed, request).await;
        });
    }

    pub fn set_sort(&self, sort: SortMode) {
        self.state.send_if_modified(|s| {
            if s.sort == sort {
                return false;
            }
            s.sort = sort;
            true
        });
    }

    /// Fetches the next page for the current query. Returns whether a fetch
    /// was started.
    pub async fn load_more(&self) -> bool {
        let mut next = None;
        self.state.send_if_modified(|s| {
            if s.loading || !s.has_more() {
                return false;
            }
            s.loading = true;
            s.error = None;
            next = Some((s.results_query.clone(), s.current_page + 1));
            true
        });
        let Some((query, page)) = next else {
            return false;
        };
        let token = self.in_flight.begin();
        self.fetch(query, page, token).await;
        true
    }

    /// Re-issues page 1 of the current query.
    pub async fn retry(&self) {
        let query = {
            let s = self.state.borrow();
            if s.debounced_query.is_empty() {
                s.query.trim().to_string()
            } else {
                s.debounced_query.clone()
            }
        };
        if query.is_empty() {
            return;
        }
        self.fetch_first_page(query, CancellationToken::new()).await;
    }

    /// Drops the pending debounce and any request in flight.
    pub fn cancel(&self) {
        self.pending.cancel();
        self.in_flight.cancel();
        self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }

    /// Marks `query` as debounced without a request when the committed
    /// results already belong to it.
    fn reuse_shown(&self, query: &str, token: &CancellationToken) -> bool {
        let mut reused = false;
        self.state.send_if_modified(|s| {
            if token.is_cancelled() || s.results_query != query || s.error.is_some() {
                return false;
            }
            reused = true;
            if s.debounced_query == query {
                return false;
            }
            s.debounced_query = query.to_string();
            true
        });
        reused
    }

    async fn fetch_first_page(&self, query: String, token: CancellationToken) {
        let token = self.in_flight.install(token);
        let started = self.state.send_if_modified(|s| {
            if token.is_cancelled() {
                return false;
            }
            s.debounced_query = query.clone();
            s.loading = true;
            s.error = None;
            true
        });
        if !started {
            debug!(query = %query, "Search cancelled before it started");
            return;
        }
        self.fetch(query, 1, token).await;
    }

    async fn fetch(&self, query: String, page: u32, token: CancellationToken) {
        debug!(query = %query, page, "Searching movies");
        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!(query = %query, page, "Search request cancelled");
                return;
            }
            result = self.catalog.search(&query, page) => result,
        };

        self.state.send_if_modified(|s| {
            if token.is_cancelled() {
                return false;
            }
            match result {
                Ok(list) => {
                    if page == 1 {
                        s.movies.clear();
                        s.results_query = query.clone();
                    }
                    let mut seen: HashSet<i64> = s.movies.iter().map(|m| m.id).collect();
                    s.movies
                        .extend(list.movies.into_iter().filter(|m| seen.insert(m.id)));
                    s.current_page = list.page;
                    s.total_pages = list.total_pages;
                    s.total_results = list.total_results;
                }
                Err(err) => {
                    warn!(query = %query, page, "Search failed: {}", err);
                    s.error = Some(LoadError::from(&err));
                }
            }
            s.loading = false;
            true
        });
    }
}
