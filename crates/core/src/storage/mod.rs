//! Durable collection store.
//!
//! The persistence boundary that survives process restarts: a single
//! record under a fixed key, holding the full watched collection as a
//! JSON-serialized array. Every save is a full rewrite, last-write-wins.

mod sqlite;

pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::watched::WatchedEntry;

/// Errors for durable store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for the durable collection store.
pub trait CollectionStore: Send + Sync {
    /// Read the persisted collection.
    ///
    /// An absent or unparseable record yields an empty collection (the
    /// malformed case is logged, never fatal). Errors are limited to
    /// storage access failures.
    fn load(&self) -> Result<Vec<WatchedEntry>, StoreError>;

    /// Overwrite the persisted record with the full current collection.
    fn save(&self, entries: &[WatchedEntry]) -> Result<(), StoreError>;
}
