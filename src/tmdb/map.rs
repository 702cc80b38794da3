use std::cmp::Ordering;

use super::wire;
use crate::models::{
    CastMember, CrewMember, Genre, Movie, MovieDetail, MovieList, Review, ReviewList, Video,
};

pub const POSTER_SIZE: &str = "w500";
pub const BACKDROP_SIZE: &str = "w1280";
pub const PROFILE_SIZE: &str = "w185";
pub const AVATAR_SIZE: &str = "w185";

pub const MAX_CAST: usize = 20;
pub const MAX_VIDEOS: usize = 6;
pub const VIDEO_SITE: &str = "YouTube";
pub const CREW_JOBS: [&str; 4] = ["Director", "Screenplay", "Writer", "Producer"];

/// Whether list items without a poster survive the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterFilter {
    RequirePoster,
    Keep,
}

/// Turns relative image paths into absolute URLs.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: String,
}

impl ImageUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, size: &str, path: Option<&str>) -> Option<String> {
        let path = path.map(str::trim).filter(|p| !p.is_empty())?;
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Some(format!("{}/{}{}", self.base, size, path))
    }

    pub fn poster(&self, path: Option<&str>) -> Option<String> {
        self.url(POSTER_SIZE, path)
    }

    pub fn backdrop(&self, path: Option<&str>) -> Option<String> {
        self.url(BACKDROP_SIZE, path)
    }

    pub fn profile(&self, path: Option<&str>) -> Option<String> {
        self.url(PROFILE_SIZE, path)
    }

    /// Review avatars sometimes carry an absolute URL behind a leading slash
    /// (`/https://secure.gravatar.com/...`).
    pub fn avatar(&self, path: Option<&str>) -> Option<String> {
        let raw = path.map(str::trim).filter(|p| !p.is_empty())?;
        let stripped = raw.trim_start_matches('/');
        if stripped.starts_with("http://") || stripped.starts_with("https://") {
            return Some(stripped.to_string());
        }
        self.url(AVATAR_SIZE, Some(raw))
    }
}

pub fn movie(images: &ImageUrls, item: wire::MovieResult) -> Movie {
    Movie {
        id: item.id,
        poster_url: images.poster(item.poster_path.as_deref()),
        backdrop_url: images.backdrop(item.backdrop_path.as_deref()),
        title: item.title,
        original_title: item.original_title,
        original_language: item.original_language,
        overview: item.overview.unwrap_or_default(),
        release_date: item.release_date.unwrap_or_default(),
        rating: item.vote_average,
        vote_count: item.vote_count,
        popularity: item.popularity,
        genre_ids: item.genre_ids,
    }
}

pub fn movie_list(
    images: &ImageUrls,
    response: wire::MovieListResponse,
    filter: PosterFilter,
) -> MovieList {
    let movies = response
        .results
        .into_iter()
        .filter(|m| filter == PosterFilter::Keep || has_path(m.poster_path.as_deref()))
        .map(|m| movie(images, m))
        .collect();

    MovieList {
        page: response.page,
        total_pages: response.total_pages,
        total_results: response.total_results,
        movies,
    }
}

pub fn movie_detail(images: &ImageUrls, detail: wire::MovieDetailResponse) -> MovieDetail {
    let credits = detail.credits.unwrap_or_default();
    let video_list = detail.videos.unwrap_or_default();
    let review_page = detail
        .reviews
        .map(|r| reviews(images, r))
        .unwrap_or_else(ReviewList::empty);

    let movie = Movie {
        id: detail.id,
        poster_url: images.poster(detail.poster_path.as_deref()),
        backdrop_url: images.backdrop(detail.backdrop_path.as_deref()),
        title: detail.title,
        original_title: detail.original_title,
        original_language: detail.original_language,
        overview: detail.overview.unwrap_or_default(),
        release_date: detail.release_date.unwrap_or_default(),
        rating: detail.vote_average,
        vote_count: detail.vote_count,
        popularity: detail.popularity,
        genre_ids: Some(detail.genres.iter().map(|g| g.id).collect()),
    };

    MovieDetail {
        movie,
        tagline: detail.tagline.filter(|t| !t.trim().is_empty()),
        runtime: detail.runtime.filter(|r| *r > 0),
        budget: detail.budget,
        revenue: detail.revenue,
        status: detail.status.unwrap_or_default(),
        homepage: detail.homepage.filter(|h| !h.trim().is_empty()),
        imdb_id: detail.imdb_id.filter(|i| !i.trim().is_empty()),
        genres: detail
            .genres
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: g.name,
            })
            .collect(),
        cast: cast(images, credits.cast),
        crew: crew(images, credits.crew),
        videos: videos(video_list.results),
        reviews: review_page,
    }
}

/// Billing order, first [`MAX_CAST`] entries.
pub fn cast(images: &ImageUrls, mut members: Vec<wire::CastCredit>) -> Vec<CastMember> {
    members.sort_by_key(|c| c.order);
    members
        .into_iter()
        .take(MAX_CAST)
        .map(|c| CastMember {
            id: c.id,
            profile_url: images.profile(c.profile_path.as_deref()),
            name: c.name,
            character: c.character.unwrap_or_default(),
            order: c.order,
        })
        .collect()
}

pub fn crew(images: &ImageUrls, members: Vec<wire::CrewCredit>) -> Vec<CrewMember> {
    members
        .into_iter()
        .filter(|c| CREW_JOBS.contains(&c.job.as_str()))
        .map(|c| CrewMember {
            id: c.id,
            profile_url: images.profile(c.profile_path.as_deref()),
            name: c.name,
            job: c.job,
            department: c.department,
        })
        .collect()
}

/// YouTube only, official first, then Trailer < Teaser < Clip < anything else.
pub fn videos(results: Vec<wire::VideoResult>) -> Vec<Video> {
    let mut list: Vec<wire::VideoResult> = results
        .into_iter()
        .filter(|v| v.site == VIDEO_SITE)
        .collect();
    // stable sort keeps upstream order between equal keys
    list.sort_by(|a, b| match b.official.cmp(&a.official) {
        Ordering::Equal => video_type_rank(&a.video_type).cmp(&video_type_rank(&b.video_type)),
        other => other,
    });
    list.into_iter()
        .take(MAX_VIDEOS)
        .map(|v| Video {
            id: v.id,
            key: v.key,
            name: v.name,
            site: v.site,
            video_type: v.video_type,
            official: v.official,
        })
        .collect()
}

fn video_type_rank(video_type: &str) -> u8 {
    match video_type {
        "Trailer" => 0,
        "Teaser" => 1,
        "Clip" => 2,
        _ => 3,
    }
}

pub fn reviews(images: &ImageUrls, response: wire::ReviewListResponse) -> ReviewList {
    let reviews = response
        .results
        .into_iter()
        .map(|r| {
            let details = r.author_details;
            let avatar_url = details
                .as_ref()
                .and_then(|d| images.avatar(d.avatar_path.as_deref()));
            let author_username = details
                .as_ref()
                .and_then(|d| d.username.clone())
                .filter(|u| !u.is_empty());
            let author = if r.author.trim().is_empty() {
                details
                    .as_ref()
                    .and_then(|d| d.name.clone())
                    .filter(|n| !n.trim().is_empty())
                    .or_else(|| author_username.clone())
                    .unwrap_or_default()
            } else {
                r.author
            };
            Review {
                id: r.id,
                author,
                author_username,
                avatar_url,
                author_rating: details.and_then(|d| d.rating),
                content: r.content,
                created_at: r.created_at,
                updated_at: r.updated_at,
                url: r.url,
            }
        })
        .collect();

    ReviewList {
        page: response.page,
        reviews,
        total_pages: response.total_pages,
        total_results: response.total_results,
    }
}

fn has_path(path: Option<&str>) -> bool {
    path.is_some_and(|p| !p.trim().is_empty())
}
