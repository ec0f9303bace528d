//! Session orchestrator.
//!
//! Wires the search and detail pipelines, the rating gate and the
//! watched collection into one consistent view state, driven by
//! discrete user intents: type a query, select a movie, rate it, commit
//! it, delete it.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::catalog::{CatalogClient, CatalogDetail, CatalogError, CatalogSummary};
use crate::fetch::{FetchError, FetchPipeline, FetchState, Fetcher};
use crate::rating::{RatingError, RatingGate, RatingView};
use crate::storage::{CollectionStore, StoreError};
use crate::watched::{WatchedCollection, WatchedEntry, WatchedError, WatchedSummary};

/// User-facing message for search transport failures.
const SEARCH_FAILED: &str = "Something went wrong with fetching movies";
/// User-facing message for detail transport failures.
const DETAIL_FAILED: &str = "Something went wrong with fetching movie details";
/// User-facing message for a catalog-level negative result.
const NOT_FOUND: &str = "Movie not found";

/// Errors for session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No movie is selected")]
    NoSelection,

    #[error("Movie details are not loaded")]
    DetailNotLoaded,

    #[error("No rating has been set")]
    NoRating,

    #[error("Movie is already in the watched collection")]
    AlreadyWatched,

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

struct SearchFetcher {
    client: Arc<dyn CatalogClient>,
}

#[async_trait]
impl Fetcher<String, Vec<CatalogSummary>> for SearchFetcher {
    async fn fetch(&self, term: &String) -> Result<Vec<CatalogSummary>, FetchError> {
        self.client.search(term).await.map_err(|e| match e {
            CatalogError::NotFound(_) => FetchError::NotFound(NOT_FOUND.to_string()),
            other => {
                warn!("Catalog search failed: {}", other);
                FetchError::Transport(SEARCH_FAILED.to_string())
            }
        })
    }
}

struct DetailFetcher {
    client: Arc<dyn CatalogClient>,
}

#[async_trait]
impl Fetcher<String, Option<CatalogDetail>> for DetailFetcher {
    async fn fetch(&self, id: &String) -> Result<Option<CatalogDetail>, FetchError> {
        match self.client.lookup(id).await {
            Ok(detail) => Ok(Some(detail)),
            Err(CatalogError::NotFound(_)) => Err(FetchError::NotFound(NOT_FOUND.to_string())),
            Err(other) => {
                warn!("Catalog lookup failed: {}", other);
                Err(FetchError::Transport(DETAIL_FAILED.to_string()))
            }
        }
    }
}

/// One user's session: query, selection, rating, collection.
///
/// Single-user by construction; intents arrive one at a time from the
/// presentation boundary, and the fetch pipelines alone deal with
/// overlapping network activity.
pub struct Session {
    max_rating: u32,
    search: FetchPipeline<String, Vec<CatalogSummary>>,
    detail: FetchPipeline<String, Option<CatalogDetail>>,
    selection: RwLock<Option<String>>,
    gate: RwLock<RatingGate>,
    watched: RwLock<WatchedCollection>,
}

impl Session {
    /// Create a session over a catalog client and a durable store.
    ///
    /// Loads the watched collection from the store; persistence
    /// problems degrade to an empty collection.
    pub fn new(
        client: Arc<dyn CatalogClient>,
        store: Arc<dyn CollectionStore>,
        max_rating: u32,
    ) -> Self {
        let search = FetchPipeline::new(
            "search",
            Arc::new(SearchFetcher {
                client: Arc::clone(&client),
            }) as Arc<dyn Fetcher<_, _>>,
        );
        let detail = FetchPipeline::new(
            "detail",
            Arc::new(DetailFetcher { client }) as Arc<dyn Fetcher<_, _>>,
        );

        Self {
            max_rating,
            search,
            detail,
            selection: RwLock::new(None),
            gate: RwLock::new(RatingGate::new(max_rating)),
            watched: RwLock::new(WatchedCollection::load(store)),
        }
    }

    /// Set the search term. Whitespace-only terms are the empty
    /// sentinel: result list cleared, no request, no error.
    pub async fn set_query(&self, term: &str) {
        let trimmed = term.trim();
        debug!(term = trimmed, "Query changed");
        let key = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.search.run(key).await;
    }

    /// Select a movie from the result list.
    ///
    /// Clears any stale detail state from a previous selection before
    /// the new fetch resolves, and primes the rating gate from the
    /// watched collection: already-rated movies get a locked gate
    /// exposing the stored rating.
    pub async fn select(&self, id: &str) {
        debug!(id = id, "Movie selected");
        *self.selection.write().await = Some(id.to_string());

        let stored_rating = self
            .watched
            .read()
            .await
            .lookup(id)
            .map(|entry| entry.user_rating);
        *self.gate.write().await = match stored_rating {
            Some(rating) => RatingGate::locked_with(rating, self.max_rating),
            None => RatingGate::new(self.max_rating),
        };

        self.detail.run(Some(id.to_string())).await;
    }

    /// Close the detail view and return to the list.
    pub async fn close_detail(&self) {
        *self.selection.write().await = None;
        *self.gate.write().await = RatingGate::new(self.max_rating);
        self.detail.run(None).await;
    }

    /// Preview a rating on hover. Display-only, never commits.
    pub async fn hover_rating(&self, value: u32) {
        self.gate.write().await.hover(value);
    }

    /// Clear the hover preview.
    pub async fn clear_hover(&self) {
        self.gate.write().await.clear_hover();
    }

    /// Stage a rating for the open detail view (the widget's click).
    pub async fn set_rating(&self, value: u32) -> Result<(), RatingError> {
        self.gate.write().await.set(value)
    }

    /// Commit the staged rating: build a watched entry from the loaded
    /// detail, insert it into the collection (persisting it), then
    /// clear the selection, returning the view to the list.
    pub async fn commit_rating(&self) -> Result<WatchedEntry, SessionError> {
        let id = self
            .selection
            .read()
            .await
            .clone()
            .ok_or(SessionError::NoSelection)?;

        let detail = self
            .detail
            .state()
            .await
            .data
            .ok_or(SessionError::DetailNotLoaded)?;

        // The selection may have moved between the two reads above; a
        // detail record belonging to another id must not be committed
        // under this one.
        if detail.id != id {
            return Err(SessionError::DetailNotLoaded);
        }

        let user_rating = {
            let gate = self.gate.read().await;
            if gate.is_locked() {
                return Err(SessionError::AlreadyWatched);
            }
            gate.committed().ok_or(SessionError::NoRating)?
        };

        let entry = WatchedEntry {
            id: detail.id,
            title: detail.title,
            year: detail.year,
            poster_url: detail.poster_url,
            runtime_minutes: detail.runtime_minutes.unwrap_or(0),
            external_rating: detail.external_rating.unwrap_or(0.0),
            user_rating,
        };

        self.watched
            .write()
            .await
            .insert(entry.clone())
            .map_err(|e| match e {
                WatchedError::Duplicate(_) => SessionError::AlreadyWatched,
                WatchedError::Store(e) => SessionError::Store(e),
            })?;

        debug!(id = %entry.id, rating = user_rating, "Rating committed");
        self.close_detail().await;

        Ok(entry)
    }

    /// Delete a watched entry. Idempotent.
    pub async fn delete_watched(&self, id: &str) -> Result<(), WatchedError> {
        debug!(id = id, "Watched entry deleted");
        self.watched.write().await.remove(id)
    }

    /// Current search result state.
    pub async fn search_state(&self) -> FetchState<Vec<CatalogSummary>> {
        self.search.state().await
    }

    /// Current detail state.
    pub async fn detail_state(&self) -> FetchState<Option<CatalogDetail>> {
        self.detail.state().await
    }

    /// The selected movie id, if any.
    pub async fn selection(&self) -> Option<String> {
        self.selection.read().await.clone()
    }

    /// Snapshot of the rating gate.
    pub async fn rating_view(&self) -> RatingView {
        self.gate.read().await.view()
    }

    /// The watched entries, in insertion order.
    pub async fn watched_entries(&self) -> Vec<WatchedEntry> {
        self.watched.read().await.entries().to_vec()
    }

    /// Aggregates over the watched collection.
    pub async fn watched_summary(&self) -> WatchedSummary {
        self.watched.read().await.summary()
    }

    /// Await all pending fetch activity on both pipelines.
    pub async fn settle(&self) {
        self.search.settle().await;
        self.detail.settle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use crate::testing::{fixtures, MockCatalogClient};

    fn session_with(client: MockCatalogClient) -> Session {
        Session::new(
            Arc::new(client),
            Arc::new(SqliteStore::in_memory().unwrap()),
            10,
        )
    }

    fn inception_client() -> MockCatalogClient {
        let client = MockCatalogClient::new();
        client.add_search_result("inception", vec![fixtures::inception_summary()]);
        client.add_detail(fixtures::inception_detail());
        client
    }

    #[tokio::test]
    async fn search_select_rate_commit_scenario() {
        let session = session_with(inception_client());

        session.set_query("inception").await;
        session.settle().await;

        let search = session.search_state().await;
        assert_eq!(search.data.len(), 1);
        assert_eq!(search.data[0].id, "tt1375666");

        session.select("tt1375666").await;
        session.settle().await;

        let detail = session.detail_state().await;
        let loaded = detail.data.expect("detail should be loaded");
        assert_eq!(loaded.runtime_minutes, Some(148));
        assert_eq!(loaded.external_rating, Some(8.8));

        session.set_rating(9).await.unwrap();
        let entry = session.commit_rating().await.unwrap();

        assert_eq!(entry.id, "tt1375666");
        assert_eq!(entry.user_rating, 9);
        assert_eq!(entry.runtime_minutes, 148);
        assert_eq!(entry.external_rating, 8.8);

        // Committing returns the view to the list.
        assert_eq!(session.selection().await, None);
        assert!(session.detail_state().await.data.is_none());
        assert_eq!(session.watched_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_query_clears_results_without_fetching() {
        let client = inception_client();
        let session = session_with(client);

        session.set_query("inception").await;
        session.settle().await;
        assert_eq!(session.search_state().await.data.len(), 1);

        session.set_query("   ").await;
        session.settle().await;

        let state = session.search_state().await;
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn unmatched_query_reports_handled_not_found() {
        let session = session_with(MockCatalogClient::new());

        session.set_query("zzzqqq123").await;
        session.settle().await;

        let state = session.search_state().await;
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("Movie not found"));
    }

    #[tokio::test]
    async fn rapid_query_sequence_reflects_only_the_last_term() {
        let client = MockCatalogClient::new();
        client.add_search_result("i", vec![fixtures::summary("tt0", "It", "2017")]);
        client.set_search_delay("i", 80);
        client.add_search_result("in", vec![fixtures::summary("tt1", "Inside Out", "2015")]);
        client.set_search_delay("in", 60);
        client.add_search_result("inception", vec![fixtures::inception_summary()]);
        let session = session_with(client);

        session.set_query("i").await;
        session.set_query("in").await;
        session.set_query("inception").await;
        session.settle().await;

        let state = session.search_state().await;
        assert_eq!(state.data.len(), 1);
        assert_eq!(state.data[0].title, "Inception");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn commit_without_rating_is_rejected() {
        let session = session_with(inception_client());

        session.set_query("inception").await;
        session.select("tt1375666").await;
        session.settle().await;

        let result = session.commit_rating().await;
        assert!(matches!(result, Err(SessionError::NoRating)));
        assert!(session.watched_entries().await.is_empty());
    }

    #[tokio::test]
    async fn commit_without_selection_is_rejected() {
        let session = session_with(inception_client());
        let result = session.commit_rating().await;
        assert!(matches!(result, Err(SessionError::NoSelection)));
    }

    #[tokio::test]
    async fn selecting_a_watched_movie_locks_the_gate() {
        let session = session_with(inception_client());

        session.select("tt1375666").await;
        session.settle().await;
        session.set_rating(8).await.unwrap();
        session.commit_rating().await.unwrap();

        // Select it again: the stored rating is read-only now.
        session.select("tt1375666").await;
        session.settle().await;

        let view = session.rating_view().await;
        assert!(view.locked);
        assert_eq!(view.committed, Some(8));

        assert!(matches!(
            session.set_rating(5).await,
            Err(RatingError::Locked)
        ));
        assert!(matches!(
            session.commit_rating().await,
            Err(SessionError::AlreadyWatched)
        ));
    }

    #[tokio::test]
    async fn delete_then_rerate_is_allowed() {
        let session = session_with(inception_client());

        session.select("tt1375666").await;
        session.settle().await;
        session.set_rating(6).await.unwrap();
        session.commit_rating().await.unwrap();

        session.delete_watched("tt1375666").await.unwrap();
        assert!(session.watched_entries().await.is_empty());

        session.select("tt1375666").await;
        session.settle().await;
        session.set_rating(9).await.unwrap();
        session.commit_rating().await.unwrap();

        let entries = session.watched_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_rating, 9);
    }

    #[tokio::test]
    async fn changing_selection_resets_gate_and_clears_stale_detail() {
        let client = inception_client();
        client.add_detail(fixtures::detail("tt0133093", "The Matrix"));
        client.set_detail_delay("tt0133093", 50);
        let session = session_with(client);

        session.select("tt1375666").await;
        session.settle().await;
        session.set_rating(9).await.unwrap();

        session.select("tt0133093").await;

        // Before the new fetch resolves: stale detail cleared, gate reset.
        let detail = session.detail_state().await;
        assert!(detail.data.is_none());
        assert!(detail.is_loading);
        assert_eq!(session.rating_view().await.committed, None);

        session.settle().await;
        let detail = session.detail_state().await;
        assert_eq!(detail.data.unwrap().title, "The Matrix");
    }

    #[tokio::test]
    async fn search_transport_failure_reports_user_facing_message() {
        let client = inception_client();
        client.set_next_search_error(CatalogError::ApiError {
            status: 500,
            message: "upstream exploded".to_string(),
        });
        let session = session_with(client);

        session.set_query("inception").await;
        session.settle().await;

        let state = session.search_state().await;
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Something went wrong with fetching movies")
        );
    }

    #[tokio::test]
    async fn detail_transport_failure_reports_user_facing_message() {
        let client = Arc::new(inception_client());
        client.set_next_lookup_error(CatalogError::ApiError {
            status: 502,
            message: "bad gateway".to_string(),
        });
        let session = Session::new(
            Arc::clone(&client) as Arc<dyn CatalogClient>,
            Arc::new(SqliteStore::in_memory().unwrap()),
            10,
        );

        session.select("tt1375666").await;
        session.settle().await;

        let state = session.detail_state().await;
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Something went wrong with fetching movie details")
        );
        // The failed lookup still reached the catalog, exactly once.
        assert_eq!(client.recorded_lookups(), vec!["tt1375666"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_select_never_corrupts_a_committed_entry() {
        // A select racing a commit must never yield an entry whose id
        // belongs to one movie and whose fields belong to another.
        for _ in 0..100 {
            let client = inception_client();
            client.add_detail(fixtures::detail("tt0133093", "The Matrix"));
            let session = Arc::new(session_with(client));

            session.select("tt1375666").await;
            session.settle().await;
            session.set_rating(9).await.unwrap();

            let committer = {
                let session = Arc::clone(&session);
                tokio::spawn(async move { session.commit_rating().await })
            };
            let selector = {
                let session = Arc::clone(&session);
                tokio::spawn(async move { session.select("tt0133093").await })
            };
            // Either side may lose the race; only consistency matters.
            let _ = committer.await;
            let _ = selector.await;
            session.settle().await;

            for entry in session.watched_entries().await {
                match entry.id.as_str() {
                    "tt1375666" => assert_eq!(entry.title, "Inception"),
                    "tt0133093" => assert_eq!(entry.title, "The Matrix"),
                    other => panic!("entry with unknown id {}", other),
                }
            }
        }
    }

    #[tokio::test]
    async fn hover_preview_never_reaches_the_collection() {
        let session = session_with(inception_client());

        session.select("tt1375666").await;
        session.settle().await;

        session.hover_rating(3).await;
        assert_eq!(session.rating_view().await.display, Some(3));

        // Hover alone never enables commit.
        assert!(matches!(
            session.commit_rating().await,
            Err(SessionError::NoRating)
        ));

        session.clear_hover().await;
        assert_eq!(session.rating_view().await.display, None);
    }

    #[tokio::test]
    async fn watched_collection_survives_restart() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        // In-memory sqlite dies with the connection, so exercise the
        // durable round trip through a shared store handle instead.
        let client = inception_client();
        let session = Session::new(
            Arc::new(client),
            Arc::clone(&store) as Arc<dyn CollectionStore>,
            10,
        );

        session.select("tt1375666").await;
        session.settle().await;
        session.set_rating(9).await.unwrap();
        session.commit_rating().await.unwrap();

        let reopened = Session::new(
            Arc::new(inception_client()),
            store as Arc<dyn CollectionStore>,
            10,
        );
        let entries = reopened.watched_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "tt1375666");
    }
}
