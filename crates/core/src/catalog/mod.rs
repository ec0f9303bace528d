//! Remote movie catalog integration.
//!
//! This module provides a client for the OMDb-style catalog API used to
//! search for movies by free text and to fetch the full record for a
//! selected title.

mod omdb;
mod types;

pub use omdb::OmdbClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The catalog answered well-formed but negative (`Response: "False"`).
    /// Distinct from a transport failure.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Trait for remote movie catalog clients.
///
/// Implemented by `OmdbClient` in production and by
/// `testing::MockCatalogClient` in tests.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search the catalog by free-text term.
    ///
    /// Returns the matching summaries, or `CatalogError::NotFound` when the
    /// catalog answers with a well-formed negative result.
    async fn search(&self, term: &str) -> Result<Vec<CatalogSummary>, CatalogError>;

    /// Fetch the full record for a catalog id.
    async fn lookup(&self, id: &str) -> Result<CatalogDetail, CatalogError>;
}
