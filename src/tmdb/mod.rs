mod client;
pub mod map;
pub mod wire;

pub use client::{build_url, Params, TmdbClient};
pub use map::{ImageUrls, PosterFilter};

pub const DETAIL_APPEND: &str = "credits,videos,reviews";
