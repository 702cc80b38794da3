use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error: unable to reach the movie service";

type BoxError = Box<dyn StdError + Send + Sync>;

/// Transport level failure talking to the metadata API.
///
/// Covers both non-2xx responses (status and status text are set) and
/// network/decoding failures (no status, generic message).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ApiError {
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        let status_text = status_text.into();
        Self {
            message: format!("API request failed: {status_text}"),
            status: Some(status),
            status_text: Some(status_text),
            source: None,
        }
    }

    pub fn network(source: impl Into<BoxError>) -> Self {
        Self {
            status: None,
            status_text: None,
            message: NETWORK_ERROR_MESSAGE.to_string(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid movie ID: {0}")]
    InvalidMovieId(i64),
}

/// Error value kept in loader state. Cheap to clone so it can live inside a
/// watch channel snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
    pub status: Option<u16>,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

impl From<&CatalogError> for LoadError {
    fn from(err: &CatalogError) -> Self {
        match err {
            CatalogError::Api(api) => Self {
                message: api.message().to_string(),
                status: api.status,
            },
            CatalogError::InvalidMovieId(_) => Self::new("Invalid movie ID"),
        }
    }
}

impl From<CatalogError> for LoadError {
    fn from(err: CatalogError) -> Self {
        Self::from(&err)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{operation} '{key}': {source}")]
    Io {
        operation: &'static str,
        key: String,
        source: std::io::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
