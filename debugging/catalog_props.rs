//! Fetch catalog data and print the adapted domain objects as JSON.
//! Usage:
//!   cargo run --bin catalog_props -- list <now-playing|popular|top-rated|upcoming> [page]
//!   cargo run --bin catalog_props -- search <query> [pages]
//!   cargo run --bin catalog_props -- movie <tmdb_id>
//!   cargo run --bin catalog_props -- reviews <tmdb_id> [page]
//!   cargo run --bin catalog_props -- watchlist <list|add|remove|toggle|clear> [tmdb_id]
//! Requires TMDB_API_TOKEN in the environment (.env supported).

use anyhow::{anyhow, Context, Result};
use cinefeed::config::DEFAULT_WATCHLIST_DIR;
use cinefeed::search::SearchController;
use cinefeed::telemetry::init_tracing;
use cinefeed::watchlist::{FileStore, WatchlistService, WatchlistStore};
use cinefeed::{Catalog, CatalogConfig, Category, MovieRepository};
use dotenvy::dotenv;
use serde::Serialize;
use std::env;
use std::sync::Arc;
use std::time::Duration;

const SEARCH_WAIT: Duration = Duration::from_secs(30);

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin catalog_props -- list <category> [page]");
    eprintln!("       cargo run --bin catalog_props -- search <query> [pages]");
    eprintln!("       cargo run --bin catalog_props -- movie <tmdb_id>");
    eprintln!("       cargo run --bin catalog_props -- reviews <tmdb_id> [page]");
    eprintln!(
        "       cargo run --bin catalog_props -- watchlist <list|add|remove|toggle|clear> [tmdb_id]"
    );
    std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], idx: usize, name: &str) -> Result<Option<T>> {
    args.get(idx)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| anyhow!("{} must be an integer, got '{}'", name, raw))
        })
        .transpose()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    if args[1] == "watchlist" {
        let dir = env::var("WATCHLIST_DIR").unwrap_or_else(|_| DEFAULT_WATCHLIST_DIR.to_string());
        return run_watchlist(&args, FileStore::new(dir));
    }

    let config = CatalogConfig::from_env()?;
    let repo = Arc::new(MovieRepository::from_config(&config)?);

    match args[1].as_str() {
        "list" => {
            let category: Category = args
                .get(2)
                .map(|s| s.parse::<Category>())
                .unwrap_or_else(|| usage())?;
            let page = parse_arg(&args, 3, "page")?.unwrap_or(1);
            print_json(&repo.category(category, page).await?)?;
        }
        "search" => {
            let query = args.get(2).cloned().unwrap_or_else(|| usage());
            let pages: u32 = parse_arg(&args, 3, "pages")?.unwrap_or(1);
            let wanted = query.trim().to_string();
            let controller = SearchController::new(repo, config.search_debounce);
            let mut rx = controller.subscribe();
            controller.set_query(query);
            // settled once the page for this query is committed, even when empty
            let wait = rx.wait_for(|s| {
                !s.loading
                    && s.debounced_query == wanted
                    && (s.results_query == wanted || s.error.is_some())
            });
            tokio::time::timeout(config.search_debounce + SEARCH_WAIT, wait)
                .await
                .context("search timed out")??;
            for _ in 1..pages {
                if !controller.load_more().await {
                    break;
                }
            }
            let state = controller.snapshot();
            if let Some(err) = &state.error {
                return Err(anyhow!("search failed: {}", err));
            }
            print_json(&state.sorted_movies())?;
            eprintln!(
                "page {}/{} ({} results)",
                state.current_page, state.total_pages, state.total_results
            );
        }
        "movie" => {
            let id = parse_arg(&args, 2, "tmdb_id")?.unwrap_or_else(|| usage());
            print_json(&repo.movie_detail(id).await?)?;
        }
        "reviews" => {
            let id = parse_arg(&args, 2, "tmdb_id")?.unwrap_or_else(|| usage());
            let page = parse_arg(&args, 3, "page")?.unwrap_or(1);
            print_json(&repo.reviews(id, page).await?)?;
        }
        _ => usage(),
    }

    Ok(())
}

fn run_watchlist(args: &[String], store: FileStore) -> Result<()> {
    let watchlist = WatchlistStore::new(WatchlistService::new(Arc::new(store)));
    let id = || -> Result<i64> {
        parse_arg(args, 3, "tmdb_id")?.ok_or_else(|| anyhow!("missing tmdb_id"))
    };
    match args.get(2).map(String::as_str) {
        Some("list") | None => {}
        Some("add") => {
            let id = id()?;
            if !watchlist.add(id) {
                eprintln!("{id} is already in the watchlist");
            }
        }
        Some("remove") => {
            let id = id()?;
            if !watchlist.remove(id) {
                eprintln!("{id} is not in the watchlist");
            }
        }
        Some("toggle") => {
            let id = id()?;
            let present = watchlist.toggle(id);
            eprintln!("{id} {}", if present { "added" } else { "removed" });
        }
        Some("clear") => watchlist.clear(),
        Some(_) => usage(),
    }
    let snapshot = watchlist.snapshot();
    print_json(&snapshot.items)?;
    eprintln!("{} item(s)", snapshot.count);
    Ok(())
}
