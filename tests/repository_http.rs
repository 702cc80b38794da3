use cinefeed::error::NETWORK_ERROR_MESSAGE;
use cinefeed::tmdb::TmdbClient;
use cinefeed::{Catalog, CatalogConfig, CatalogError, Category, MovieRepository};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn config(server: &MockServer) -> CatalogConfig {
    CatalogConfig::new(TOKEN)
        .with_api_base_url(format!("{}/3", server.uri()))
        .with_image_base_url("https://image.tmdb.org/t/p")
}

fn repository(server: &MockServer) -> MovieRepository {
    MovieRepository::from_config(&config(server)).expect("repository")
}

fn list_item(id: i64, poster: Option<&str>) -> Value {
    json!({
        "id": id,
        "title": format!("Movie {id}"),
        "original_title": format!("Movie {id}"),
        "original_language": "en",
        "overview": "Overview",
        "poster_path": poster,
        "backdrop_path": "/backdrop.jpg",
        "release_date": "2024-03-01",
        "vote_average": 6.5,
        "vote_count": 321,
        "popularity": 88.1,
        "genre_ids": [28, 12]
    })
}

fn detail_body() -> Value {
    let cast: Vec<Value> = (0..25)
        .map(|i| {
            let profile = (i % 2 == 0).then(|| format!("/actor{i}.jpg"));
            json!({
                "id": 1000 + i,
                "name": format!("Actor {i}"),
                "character": format!("Role {i}"),
                "profile_path": profile,
                "order": 24 - i
            })
        })
        .collect();
    json!({
        "id": 272,
        "title": "Batman Begins",
        "original_title": "Batman Begins",
        "original_language": "en",
        "overview": "Driven by tragedy...",
        "poster_path": "/poster.jpg",
        "backdrop_path": null,
        "release_date": "2005-06-10",
        "vote_average": 7.7,
        "vote_count": 21000,
        "popularity": 70.2,
        "tagline": "Evil fears the knight.",
        "runtime": 140,
        "budget": 150000000,
        "revenue": 373661946,
        "status": "Released",
        "homepage": "",
        "imdb_id": "tt0372784",
        "genres": [{ "id": 28, "name": "Action" }, { "id": 80, "name": "Crime" }],
        "credits": {
            "cast": cast,
            "crew": [
                { "id": 1, "name": "Christopher Nolan", "job": "Director", "department": "Directing", "profile_path": null },
                { "id": 2, "name": "Hans Zimmer", "job": "Original Music Composer", "department": "Sound", "profile_path": null },
                { "id": 3, "name": "David S. Goyer", "job": "Screenplay", "department": "Writing", "profile_path": "/goyer.jpg" },
                { "id": 4, "name": "Emma Thomas", "job": "Producer", "department": "Production", "profile_path": null }
            ]
        },
        "videos": {
            "results": [
                { "id": "a", "key": "k-a", "name": "Featurette", "site": "YouTube", "type": "Featurette", "official": true },
                { "id": "b", "key": "k-b", "name": "Trailer", "site": "YouTube", "type": "Trailer", "official": true },
                { "id": "c", "key": "k-c", "name": "Vimeo Trailer", "site": "Vimeo", "type": "Trailer", "official": true }
            ]
        },
        "reviews": {
            "page": 1,
            "total_pages": 3,
            "total_results": 45,
            "results": [{
                "id": "r1",
                "author": "critic",
                "author_details": { "name": "", "username": "critic", "avatar_path": "/https://secure.gravatar.com/avatar/c.jpg", "rating": 9.0 },
                "content": "Great reboot.",
                "created_at": "2020-01-01T00:00:00.000Z",
                "updated_at": "2020-01-02T00:00:00.000Z",
                "url": "https://www.themoviedb.org/review/r1"
            }]
        }
    })
}

#[tokio::test]
async fn category_sends_auth_and_filters_posterless_movies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/popular"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .and(query_param("language", "en-US"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "total_pages": 500,
            "total_results": 10000,
            "results": [list_item(1, Some("/one.jpg")), list_item(2, None), list_item(3, Some("/three.jpg"))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = repository(&server).popular(2).await.expect("popular");
    assert_eq!(list.movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(list.page, 2);
    assert_eq!(list.total_pages, 500);
    assert_eq!(list.total_results, 10000);
    assert_eq!(
        list.movies[0].poster_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/one.jpg")
    );
    assert_eq!(
        list.movies[0].backdrop_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w1280/backdrop.jpg")
    );
}

#[tokio::test]
async fn every_category_hits_its_endpoint() {
    let server = MockServer::start().await;
    for endpoint in ["now_playing", "popular", "top_rated", "upcoming"] {
        Mock::given(method("GET"))
            .and(path(format!("/3/movie/{endpoint}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "total_pages": 1,
                "total_results": 1,
                "results": [list_item(7, Some("/p.jpg"))]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let repo = repository(&server);
    for category in Category::ALL {
        let list = repo.category(category, 1).await.expect("category");
        assert_eq!(list.movies.len(), 1, "{category}");
    }
}

#[tokio::test]
async fn search_keeps_posterless_results_and_encodes_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "the dark knight"))
        .and(query_param("page", "1"))
        .and(query_param("include_adult", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "total_pages": 5,
            "total_results": 98,
            "results": [list_item(155, Some("/tdk.jpg")), list_item(999, None)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = repository(&server)
        .search("  the dark knight ", 1)
        .await
        .expect("search");
    assert_eq!(list.movies.len(), 2);
    assert_eq!(list.movies[1].poster_url, None);
    assert_eq!(list.total_pages, 5);
}

#[tokio::test]
async fn blank_search_skips_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let list = repository(&server).search("   ", 1).await.expect("search");
    assert!(list.movies.is_empty());
    assert_eq!(list.total_pages, 0);
    assert_eq!(list.total_results, 0);
}

#[tokio::test]
async fn detail_applies_credit_video_and_review_policies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/272"))
        .and(query_param("append_to_response", "credits,videos,reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body()))
        .expect(1)
        .mount(&server)
        .await;

    let detail = repository(&server).movie_detail(272).await.expect("detail");
    assert_eq!(detail.movie.title, "Batman Begins");
    assert_eq!(detail.movie.backdrop_url, None);
    assert_eq!(detail.tagline.as_deref(), Some("Evil fears the knight."));
    assert_eq!(detail.homepage, None);
    assert_eq!(detail.imdb_id.as_deref(), Some("tt0372784"));
    assert_eq!(detail.movie.genre_ids, Some(vec![28, 80]));

    assert_eq!(detail.cast.len(), 20);
    assert_eq!(detail.cast[0].order, 0);
    assert_eq!(detail.cast[0].name, "Actor 24");
    assert!(detail.cast.windows(2).all(|w| w[0].order <= w[1].order));

    assert_eq!(
        detail.crew.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["Christopher Nolan", "David S. Goyer", "Emma Thomas"]
    );

    assert_eq!(
        detail.videos.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
        vec!["b", "a"]
    );

    assert_eq!(detail.reviews.total_pages, 3);
    assert_eq!(
        detail.reviews.reviews[0].avatar_url.as_deref(),
        Some("https://secure.gravatar.com/avatar/c.jpg")
    );
}

#[tokio::test]
async fn reviews_page_is_requested_with_page_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/272/reviews"))
        .and(query_param("page", "2"))
        .and(query_param_is_missing("append_to_response"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 272,
            "page": 2,
            "total_pages": 3,
            "total_results": 45,
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = repository(&server).reviews(272, 2).await.expect("reviews");
    assert_eq!(page.page, 2);
    assert!(page.reviews.is_empty());
}

#[tokio::test]
async fn non_success_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found.",
            "success": false
        })))
        .mount(&server)
        .await;

    let err = repository(&server).movie_detail(1).await.unwrap_err();
    let api = match err {
        CatalogError::Api(api) => api,
        other => panic!("expected api error, got {other:?}"),
    };
    assert_eq!(api.status, Some(404));
    assert_eq!(api.status_text.as_deref(), Some("Not Found"));
    assert_eq!(api.to_string(), "API request failed: Not Found");
}

#[tokio::test]
async fn malformed_body_becomes_generic_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/upcoming"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = repository(&server).upcoming(1).await.unwrap_err();
    let api = match err {
        CatalogError::Api(api) => api,
        other => panic!("expected api error, got {other:?}"),
    };
    assert_eq!(api.status, None);
    assert_eq!(api.to_string(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn unreachable_server_becomes_generic_api_error() {
    let config = CatalogConfig::new(TOKEN).with_api_base_url("http://127.0.0.1:1/3");
    let client = TmdbClient::new(&config).expect("client");
    let err = client
        .get_json::<Value>("movie/popular", &[("page", Some("1".to_string()))])
        .await
        .unwrap_err();
    assert_eq!(err.status, None);
    assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn invalid_ids_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let repo = repository(&server);
    assert!(matches!(
        repo.movie_detail(0).await,
        Err(CatalogError::InvalidMovieId(0))
    ));
    assert!(matches!(
        repo.reviews(-3, 1).await,
        Err(CatalogError::InvalidMovieId(-3))
    ));
}
