//! Cancellable fetch pipeline.
//!
//! This module provides the race-safety primitive the whole system is
//! built on: given a rapidly-changing input key (a search term, a
//! selected id), perform one in-flight request per key change and
//! guarantee that a superseded request's outcome is never applied.

mod pipeline;
mod types;

pub use pipeline::FetchPipeline;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Terminal failure of a single fetch, carrying the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The remote answered well-formed but negative.
    #[error("{0}")]
    NotFound(String),

    /// Network failure, non-success HTTP status, or unparseable body.
    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NotFound(_) => "not_found",
            FetchError::Transport(_) => "transport",
        }
    }
}

/// The request a pipeline issues for a key.
///
/// Implementations wrap a `CatalogClient` call and translate its errors
/// into the user-facing `FetchError` messages.
#[async_trait]
pub trait Fetcher<K, T>: Send + Sync {
    async fn fetch(&self, key: &K) -> Result<T, FetchError>;
}
