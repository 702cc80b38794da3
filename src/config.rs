use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_WATCHLIST_DIR: &str = ".cinefeed";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub image_base_url: String,
    pub language: String,
    pub search_debounce: Duration,
    pub watchlist_dir: PathBuf,
}

impl CatalogConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            api_token: api_token.into(),
            image_base_url: DEFAULT_IMAGE_BASE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            watchlist_dir: PathBuf::from(DEFAULT_WATCHLIST_DIR),
        }
    }

    /// Reads settings from the process environment. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let api_token = env::var("TMDB_API_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .context("TMDB_API_TOKEN not set")?;
        let mut config = Self::new(api_token);

        if let Some(base) = non_empty_var("TMDB_API_BASE_URL") {
            config = config.with_api_base_url(base);
        }
        if let Some(base) = non_empty_var("TMDB_IMAGE_BASE_URL") {
            config = config.with_image_base_url(base);
        }
        if let Some(language) = non_empty_var("TMDB_LANGUAGE") {
            config.language = language;
        }
        if let Some(raw) = non_empty_var("SEARCH_DEBOUNCE_MS") {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("SEARCH_DEBOUNCE_MS is not a number: {raw}"))?;
            config.search_debounce = Duration::from_millis(ms);
        }
        if let Some(dir) = non_empty_var("WATCHLIST_DIR") {
            config.watchlist_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = trim_slash(url.into());
        self
    }

    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = trim_slash(url.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    pub fn with_watchlist_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.watchlist_dir = dir.into();
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
