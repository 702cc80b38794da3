use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::error::ApiError;

/// Query parameters for one request. `None` and empty values are left out of
/// the query string.
pub type Params<'a> = [(&'a str, Option<String>)];

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl TmdbClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, ApiError> {
        let user_agent = format!("cinefeed/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(ApiError::network)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &Params<'_>,
    ) -> Result<T, ApiError> {
        let url = build_url(&self.base_url, endpoint, params);
        debug!(endpoint = %endpoint, "TMDB request");

        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %endpoint, "TMDB request failed: {}", e);
                ApiError::network(e)
            })?;

        let status = res.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("");
            warn!(endpoint = %endpoint, status = status.as_u16(), "TMDB returned {}", status);
            return Err(ApiError::http(status.as_u16(), status_text));
        }

        let bytes = res.bytes().await.map_err(|e| {
            warn!(endpoint = %endpoint, "Reading TMDB body failed: {}", e);
            ApiError::network(e)
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(endpoint = %endpoint, "TMDB JSON parse failed: {}", e);
            ApiError::network(e)
        })
    }
}

pub fn build_url(base: &str, endpoint: &str, params: &Params<'_>) -> String {
    let query = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", urlencoding::encode(key), urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&");

    let endpoint = endpoint.trim_start_matches('/');
    let base = base.trim_end_matches('/');
    if query.is_empty() {
        format!("{base}/{endpoint}")
    } else {
        format!("{base}/{endpoint}?{query}")
    }
}
