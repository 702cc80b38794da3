pub mod browse;
pub mod config;
pub mod detail;
pub mod error;
pub mod models;
pub mod repository;
pub mod reviews;
pub mod search;
pub mod telemetry;
pub mod tmdb;
pub mod watchlist;

pub use config::CatalogConfig;
pub use error::{ApiError, CatalogError, LoadError, StorageError};
pub use repository::{Catalog, Category, MovieRepository};
