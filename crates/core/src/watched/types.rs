//! Types for the watched collection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StoreError;

/// A rated movie in the user's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedEntry {
    /// Catalog id, unique within the collection.
    pub id: String,
    /// Movie title.
    pub title: String,
    /// Release year.
    pub year: String,
    /// Poster image URL.
    pub poster_url: String,
    /// Runtime in minutes (0 when the catalog did not report one).
    pub runtime_minutes: u32,
    /// Catalog rating on a 0-10 scale (0.0 when not reported).
    pub external_rating: f64,
    /// The user's own rating, 1..=max_rating.
    pub user_rating: u32,
}

/// Aggregates over the collection, shown alongside the watched list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchedSummary {
    /// Number of entries.
    pub count: usize,
    /// Mean catalog rating, 0.0 for an empty collection.
    pub avg_external_rating: f64,
    /// Mean user rating, 0.0 for an empty collection.
    pub avg_user_rating: f64,
    /// Mean runtime in minutes, 0.0 for an empty collection.
    pub avg_runtime_minutes: f64,
}

/// Errors for collection operations.
#[derive(Debug, Error)]
pub enum WatchedError {
    /// An entry with this id is already present.
    #[error("Already in the watched collection: {0}")]
    Duplicate(String),

    /// The durable store rejected the rewrite.
    #[error(transparent)]
    Store(#[from] StoreError),
}
