//! OMDb API client.
//!
//! OMDb requires an API key for access. Search and lookup share a single
//! endpoint; the query parameter (`s` vs `i`) selects the operation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::CatalogConfig;

use super::{CatalogClient, CatalogError, CatalogDetail, CatalogSummary};

/// OMDb API client.
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Create a new OMDb client.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.api_key.is_empty() {
            return Err(CatalogError::NotConfigured(
                "OMDb API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build the API URL for one operation (`s` for search, `i` for lookup).
    fn build_url(&self, param: &str, value: &str) -> String {
        format!(
            "{}/?apikey={}&{}={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            param,
            urlencoding::encode(value)
        )
    }

    async fn get(&self, url: &str) -> Result<serde_json::Value, CatalogError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == 401 {
            return Err(CatalogError::NotConfigured(
                "Invalid OMDb API key".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("Invalid JSON body: {}", e)))
    }
}

#[async_trait]
impl CatalogClient for OmdbClient {
    async fn search(&self, term: &str) -> Result<Vec<CatalogSummary>, CatalogError> {
        debug!(term = term, "OMDb search");

        let body = self.get(&self.build_url("s", term)).await?;
        let parsed: OmdbSearchResponse = serde_json::from_value(body)
            .map_err(|e| CatalogError::ParseError(format!("Search response: {}", e)))?;

        if parsed.response != "True" {
            return Err(CatalogError::NotFound(
                parsed.error.unwrap_or_else(|| "Movie not found".to_string()),
            ));
        }

        Ok(parsed.search.into_iter().map(Into::into).collect())
    }

    async fn lookup(&self, id: &str) -> Result<CatalogDetail, CatalogError> {
        debug!(id = id, "OMDb lookup");

        let body = self.get(&self.build_url("i", id)).await?;
        let parsed: OmdbDetailResponse = serde_json::from_value(body)
            .map_err(|e| CatalogError::ParseError(format!("Detail response: {}", e)))?;

        if parsed.response != "True" {
            return Err(CatalogError::NotFound(
                parsed.error.unwrap_or_else(|| id.to_string()),
            ));
        }

        Ok(parsed.into())
    }
}

/// Parse an OMDb runtime string like `"148 min"` into minutes.
///
/// Returns `None` for `"N/A"` or anything else that does not start with
/// a number.
fn parse_runtime_minutes(raw: &str) -> Option<u32> {
    raw.split_whitespace().next()?.parse().ok()
}

/// Parse an OMDb rating string like `"8.8"`. `"N/A"` becomes `None`.
fn parse_rating(raw: &str) -> Option<f64> {
    raw.parse().ok()
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Poster")]
    poster: String,
}

impl From<OmdbSearchItem> for CatalogSummary {
    fn from(item: OmdbSearchItem) -> Self {
        Self {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: item.poster,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

impl From<OmdbDetailResponse> for CatalogDetail {
    fn from(r: OmdbDetailResponse) -> Self {
        Self {
            id: r.imdb_id,
            title: r.title,
            year: r.year,
            released: r.released,
            poster_url: r.poster,
            plot: r.plot,
            genre: r.genre,
            runtime_minutes: parse_runtime_minutes(&r.runtime),
            external_rating: parse_rating(&r.imdb_rating),
            actors: r.actors,
            director: r.director,
        }
    }
}
