use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::{ApiError, CatalogError};
use crate::models::{MovieDetail, MovieList, ReviewList};
use crate::tmdb::{self, map, wire, ImageUrls, PosterFilter, TmdbClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::NowPlaying,
        Category::Popular,
        Category::TopRated,
        Category::Upcoming,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::NowPlaying => "movie/now_playing",
            Category::Popular => "movie/popular",
            Category::TopRated => "movie/top_rated",
            Category::Upcoming => "movie/upcoming",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::NowPlaying => "Now Playing",
            Category::Popular => "Popular",
            Category::TopRated => "Top Rated",
            Category::Upcoming => "Upcoming",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Category::NowPlaying => "now-playing",
            Category::Popular => "popular",
            Category::TopRated => "top-rated",
            Category::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == normalized)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown category '{}' (expected now-playing, popular, top-rated or upcoming)",
                    s
                )
            })
    }
}

/// One call per use case. The loaders talk to this trait so tests can swap in
/// fakes.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn category(&self, category: Category, page: u32) -> Result<MovieList, CatalogError>;
    async fn search(&self, query: &str, page: u32) -> Result<MovieList, CatalogError>;
    async fn movie_detail(&self, id: i64) -> Result<MovieDetail, CatalogError>;
    async fn reviews(&self, movie_id: i64, page: u32) -> Result<ReviewList, CatalogError>;

    async fn now_playing(&self, page: u32) -> Result<MovieList, CatalogError> {
        self.category(Category::NowPlaying, page).await
    }

    async fn popular(&self, page: u32) -> Result<MovieList, CatalogError> {
        self.category(Category::Popular, page).await
    }

    async fn top_rated(&self, page: u32) -> Result<MovieList, CatalogError> {
        self.category(Category::TopRated, page).await
    }

    async fn upcoming(&self, page: u32) -> Result<MovieList, CatalogError> {
        self.category(Category::Upcoming, page).await
    }
}

#[derive(Debug, Clone)]
pub struct MovieRepository {
    client: TmdbClient,
    images: ImageUrls,
    language: String,
}

impl MovieRepository {
    pub fn new(client: TmdbClient, images: ImageUrls, language: impl Into<String>) -> Self {
        Self {
            client,
            images,
            language: language.into(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, ApiError> {
        Ok(Self::new(
            TmdbClient::new(config)?,
            ImageUrls::new(config.image_base_url.clone()),
            config.language.clone(),
        ))
    }

    fn language(&self) -> (&'static str, Option<String>) {
        ("language", Some(self.language.clone()))
    }
}

#[async_trait]
impl Catalog for MovieRepository {
    async fn category(&self, category: Category, page: u32) -> Result<MovieList, CatalogError> {
        let params = [self.language(), ("page", Some(page.to_string()))];
        let response: wire::MovieListResponse =
            self.client.get_json(category.endpoint(), &params).await?;
        Ok(map::movie_list(
            &self.images,
            response,
            PosterFilter::RequirePoster,
        ))
    }

    async fn search(&self, query: &str, page: u32) -> Result<MovieList, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Skipping search for blank query");
            return Ok(MovieList::empty());
        }
        let params = [
            self.language(),
            ("query", Some(query.to_string())),
            ("page", Some(page.to_string())),
            ("include_adult", Some("false".to_string())),
        ];
        let response: wire::MovieListResponse =
            self.client.get_json("search/movie", &params).await?;
        Ok(map::movie_list(&self.images, response, PosterFilter::Keep))
    }

    async fn movie_detail(&self, id: i64) -> Result<MovieDetail, CatalogError> {
        if id <= 0 {
            return Err(CatalogError::InvalidMovieId(id));
        }
        let params = [
            self.language(),
            ("append_to_response", Some(tmdb::DETAIL_APPEND.to_string())),
        ];
        let response: wire::MovieDetailResponse = self
            .client
            .get_json(&format!("movie/{id}"), &params)
            .await?;
        Ok(map::movie_detail(&self.images, response))
    }

    async fn reviews(&self, movie_id: i64, page: u32) -> Result<ReviewList, CatalogError> {
        if movie_id <= 0 {
            return Err(CatalogError::InvalidMovieId(movie_id));
        }
        let params = [self.language(), ("page", Some(page.to_string()))];
        let response: wire::ReviewListResponse = self
            .client
            .get_json(&format!("movie/{movie_id}/reviews"), &params)
            .await?;
        Ok(map::reviews(&self.images, response))
    }
}
