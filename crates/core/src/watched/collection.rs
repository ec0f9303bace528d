//! In-memory collection backed by the durable store.

use std::sync::Arc;

use tracing::{info, warn};

use crate::metrics::{STORE_WRITE_FAILURES_TOTAL, WATCHED_COLLECTION_SIZE};
use crate::storage::CollectionStore;

use super::{WatchedEntry, WatchedError, WatchedSummary};

/// The watched collection manager.
///
/// Owns the in-memory entries and keeps the durable store in sync:
/// every successful mutation is followed synchronously by a full
/// rewrite of the persisted record.
pub struct WatchedCollection {
    entries: Vec<WatchedEntry>,
    store: Arc<dyn CollectionStore>,
}

impl WatchedCollection {
    /// Load the collection from the durable store.
    ///
    /// A store read failure degrades to an empty collection; startup
    /// never fails on persistence problems.
    pub fn load(store: Arc<dyn CollectionStore>) -> Self {
        let entries = match store.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to load watched collection, starting empty: {}", e);
                Vec::new()
            }
        };

        if !entries.is_empty() {
            info!("Loaded {} watched entries", entries.len());
        }
        WATCHED_COLLECTION_SIZE.set(entries.len() as i64);

        Self { entries, store }
    }

    /// Append an entry.
    ///
    /// The caller normally checks already-present status first, but a
    /// duplicate id is rejected here as well rather than silently
    /// duplicated.
    pub fn insert(&mut self, entry: WatchedEntry) -> Result<(), WatchedError> {
        if self.entries.iter().any(|e| e.id == entry.id) {
            return Err(WatchedError::Duplicate(entry.id));
        }

        self.entries.push(entry);
        self.persist()?;
        Ok(())
    }

    /// Remove the entry with the given id. Idempotent: removing an
    /// absent id is a no-op, not an error.
    pub fn remove(&mut self, id: &str) -> Result<(), WatchedError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);

        if self.entries.len() == before {
            return Ok(());
        }

        self.persist()?;
        Ok(())
    }

    /// Find an entry by id.
    pub fn lookup(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregates over the collection. Averages over an empty
    /// collection are 0.0, not NaN.
    pub fn summary(&self) -> WatchedSummary {
        let count = self.entries.len();
        if count == 0 {
            return WatchedSummary {
                count: 0,
                avg_external_rating: 0.0,
                avg_user_rating: 0.0,
                avg_runtime_minutes: 0.0,
            };
        }

        let n = count as f64;
        WatchedSummary {
            count,
            avg_external_rating: self.entries.iter().map(|e| e.external_rating).sum::<f64>() / n,
            avg_user_rating: self.entries.iter().map(|e| e.user_rating as f64).sum::<f64>() / n,
            avg_runtime_minutes: self
                .entries
                .iter()
                .map(|e| e.runtime_minutes as f64)
                .sum::<f64>()
                / n,
        }
    }

    fn persist(&self) -> Result<(), WatchedError> {
        if let Err(e) = self.store.save(&self.entries) {
            STORE_WRITE_FAILURES_TOTAL.inc();
            return Err(e.into());
        }
        WATCHED_COLLECTION_SIZE.set(self.entries.len() as i64);
        Ok(())
    }
}
