use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub release_date: String,
    pub rating: f64,
    pub vote_count: u64,
    pub popularity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<i64>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieList {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub movies: Vec<Movie>,
}

impl MovieList {
    pub fn empty() -> Self {
        Self {
            page: 1,
            total_pages: 0,
            total_results: 0,
            movies: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub tagline: Option<String>,
    pub runtime: Option<u32>,
    pub budget: u64,
    pub revenue: u64,
    pub status: String,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub genres: Vec<Genre>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub videos: Vec<Video>,
    pub reviews: ReviewList,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: String,
    pub profile_url: Option<String>,
    pub order: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    pub job: String,
    pub department: String,
    pub profile_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    pub official: bool,
}

impl Video {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.key)
    }

    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/hqdefault.jpg", self.key)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: String,
    pub author_username: Option<String>,
    pub avatar_url: Option<String>,
    pub author_rating: Option<f64>,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewList {
    pub page: u32,
    pub reviews: Vec<Review>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl ReviewList {
    pub fn empty() -> Self {
        Self {
            page: 1,
            reviews: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub movie_id: i64,
    #[serde(with = "iso_millis")]
    pub added_at: DateTime<Utc>,
}

pub const WATCHLIST_VERSION: u32 = 1;

/// Persisted watchlist document, newest item first.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WatchlistData {
    pub items: Vec<WatchlistItem>,
    pub version: u32,
}

impl Default for WatchlistData {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            version: WATCHLIST_VERSION,
        }
    }
}

/// `2024-01-02T03:04:05.678Z`, the shape browsers emit for `toISOString`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
