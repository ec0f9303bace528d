//! Test doubles and fixtures.
//!
//! This module provides a controllable in-memory `CatalogClient` plus
//! canned catalog records, used by unit tests here and by the server's
//! integration tests. It ships in the library (not behind `cfg(test)`)
//! so downstream crates can drive a session without network access.

mod mock_catalog;

pub use mock_catalog::MockCatalogClient;

/// Canned catalog records for tests.
pub mod fixtures {
    use crate::catalog::{CatalogDetail, CatalogSummary};

    /// A summary with the given identity and a placeholder poster.
    pub fn summary(id: &str, title: &str, year: &str) -> CatalogSummary {
        CatalogSummary {
            id: id.to_string(),
            title: title.to_string(),
            year: year.to_string(),
            poster_url: format!("https://img.example/{}.jpg", id),
        }
    }

    /// A complete detail record with typical field values.
    pub fn detail(id: &str, title: &str) -> CatalogDetail {
        CatalogDetail {
            id: id.to_string(),
            title: title.to_string(),
            year: "2010".to_string(),
            released: "16 Jul 2010".to_string(),
            poster_url: format!("https://img.example/{}.jpg", id),
            plot: "A placeholder plot.".to_string(),
            genre: "Drama".to_string(),
            runtime_minutes: Some(120),
            external_rating: Some(7.5),
            actors: "Some Actors".to_string(),
            director: "Some Director".to_string(),
        }
    }

    pub fn inception_summary() -> CatalogSummary {
        summary("tt1375666", "Inception", "2010")
    }

    pub fn inception_detail() -> CatalogDetail {
        CatalogDetail {
            id: "tt1375666".to_string(),
            title: "Inception".to_string(),
            year: "2010".to_string(),
            released: "16 Jul 2010".to_string(),
            poster_url: "https://img.example/tt1375666.jpg".to_string(),
            plot: "A thief who steals corporate secrets through dream-sharing.".to_string(),
            genre: "Action, Adventure, Sci-Fi".to_string(),
            runtime_minutes: Some(148),
            external_rating: Some(8.8),
            actors: "Leonardo DiCaprio, Joseph Gordon-Levitt".to_string(),
            director: "Christopher Nolan".to_string(),
        }
    }
}
