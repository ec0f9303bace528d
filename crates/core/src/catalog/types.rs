//! Types for the remote movie catalog.

use serde::{Deserialize, Serialize};

/// One row of a search result.
///
/// Ephemeral: recreated on every search, owned by the pipeline that
/// fetched it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    /// Stable external identifier (e.g. "tt1375666").
    pub id: String,
    /// Movie title.
    pub title: String,
    /// Release year as reported by the catalog.
    pub year: String,
    /// Poster image URL.
    pub poster_url: String,
}

/// The full catalog record for a single title.
///
/// Numeric fields the catalog reports as `"N/A"` are represented as
/// `None`, never as inline fallback values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDetail {
    /// Stable external identifier.
    pub id: String,
    /// Movie title.
    pub title: String,
    /// Release year.
    pub year: String,
    /// Release date as reported by the catalog (e.g. "16 Jul 2010").
    pub released: String,
    /// Poster image URL.
    pub poster_url: String,
    /// Plot synopsis.
    pub plot: String,
    /// Genre list, comma separated.
    pub genre: String,
    /// Runtime in minutes, if the catalog reported one.
    pub runtime_minutes: Option<u32>,
    /// External rating on a 0-10 scale, if the catalog reported one.
    pub external_rating: Option<f64>,
    /// Main cast, comma separated.
    pub actors: String,
    /// Director name(s).
    pub director: String,
}
