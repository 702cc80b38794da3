#![allow(dead_code)]

use cinefeed::models::{Movie, MovieDetail, MovieList, Review, ReviewList};
use cinefeed::{ApiError, Catalog, CatalogError, Category};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted catalog. Unscripted calls fail with a 404.
#[derive(Default)]
pub struct FakeCatalog {
    pub searches: Mutex<HashMap<(String, u32), MovieList>>,
    pub search_delays: Mutex<HashMap<String, Duration>>,
    pub categories: Mutex<HashMap<Category, MovieList>>,
    pub details: Mutex<HashMap<i64, MovieDetail>>,
    pub reviews: Mutex<HashMap<(i64, u32), ReviewList>>,
    pub review_delay: Mutex<Duration>,
    pub failures: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next(&self, call: &str) {
        self.failures.lock().unwrap().push(call.to_string());
    }

    fn record(&self, call: String) -> Result<(), CatalogError> {
        self.calls.lock().unwrap().push(call.clone());
        let mut failures = self.failures.lock().unwrap();
        if let Some(pos) = failures.iter().position(|f| *f == call) {
            failures.remove(pos);
            return Err(ApiError::http(500, "Internal Server Error").into());
        }
        Ok(())
    }
}

fn not_found() -> CatalogError {
    ApiError::http(404, "Not Found").into()
}

#[async_trait::async_trait]
impl Catalog for FakeCatalog {
    async fn category(&self, category: Category, page: u32) -> Result<MovieList, CatalogError> {
        self.record(format!("category:{}:{page}", category.slug()))?;
        self.categories
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn search(&self, query: &str, page: u32) -> Result<MovieList, CatalogError> {
        let delay = self
            .search_delays
            .lock()
            .unwrap()
            .get(query)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;
        self.record(format!("search:{query}:{page}"))?;
        self.searches
            .lock()
            .unwrap()
            .get(&(query.to_string(), page))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn movie_detail(&self, id: i64) -> Result<MovieDetail, CatalogError> {
        self.record(format!("detail:{id}"))?;
        self.details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn reviews(&self, movie_id: i64, page: u32) -> Result<ReviewList, CatalogError> {
        let delay = *self.review_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        self.record(format!("reviews:{movie_id}:{page}"))?;
        self.reviews
            .lock()
            .unwrap()
            .get(&(movie_id, page))
            .cloned()
            .ok_or_else(not_found)
    }
}

pub fn movie(id: i64) -> Movie {
    Movie {
        id,
        title: format!("Movie {id}"),
        original_title: format!("Movie {id}"),
        original_language: "en".to_string(),
        overview: String::new(),
        poster_url: Some(format!("https://image.tmdb.org/t/p/w500/{id}.jpg")),
        backdrop_url: None,
        release_date: "2020-01-01".to_string(),
        rating: (id % 10) as f64,
        vote_count: 10,
        popularity: id as f64,
        genre_ids: None,
    }
}

pub fn page(
    ids: impl IntoIterator<Item = i64>,
    page: u32,
    total_pages: u32,
    total_results: u32,
) -> MovieList {
    MovieList {
        page,
        total_pages,
        total_results,
        movies: ids.into_iter().map(movie).collect(),
    }
}

pub fn review(id: &str) -> Review {
    Review {
        id: id.to_string(),
        author: "critic".to_string(),
        author_username: None,
        avatar_url: None,
        author_rating: None,
        content: format!("Review {id}"),
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        updated_at: None,
        url: None,
    }
}

pub fn review_page(ids: &[&str], page: u32, total_pages: u32) -> ReviewList {
    ReviewList {
        page,
        reviews: ids.iter().map(|id| review(id)).collect(),
        total_pages,
        total_results: total_pages * 20,
    }
}

pub fn detail(id: i64) -> MovieDetail {
    MovieDetail {
        movie: movie(id),
        tagline: None,
        runtime: Some(120),
        budget: 0,
        revenue: 0,
        status: "Released".to_string(),
        homepage: None,
        imdb_id: None,
        genres: Vec::new(),
        cast: Vec::new(),
        crew: Vec::new(),
        videos: Vec::new(),
        reviews: review_page(&["r1"], 1, 3),
    }
}
