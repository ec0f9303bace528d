//! Mock catalog client for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::{CatalogClient, CatalogDetail, CatalogError, CatalogSummary};

/// Mock implementation of the `CatalogClient` trait.
///
/// Provides controllable behavior for testing:
/// - Per-term search results and per-id detail records
/// - Per-key artificial latency, for exercising request races
/// - One-shot error injection
/// - Recorded calls for assertions
///
/// Unconfigured terms and ids answer with `CatalogError::NotFound`,
/// mirroring the real catalog's well-formed negative response.
#[derive(Default)]
pub struct MockCatalogClient {
    search_results: Mutex<HashMap<String, Vec<CatalogSummary>>>,
    details: Mutex<HashMap<String, CatalogDetail>>,
    search_delays_ms: Mutex<HashMap<String, u64>>,
    detail_delays_ms: Mutex<HashMap<String, u64>>,
    next_search_error: Mutex<Option<CatalogError>>,
    next_lookup_error: Mutex<Option<CatalogError>>,
    recorded_searches: Mutex<Vec<String>>,
    recorded_lookups: Mutex<Vec<String>>,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the summaries returned for a search term.
    pub fn add_search_result(&self, term: &str, results: Vec<CatalogSummary>) {
        self.search_results
            .lock()
            .unwrap()
            .insert(term.to_string(), results);
    }

    /// Configure the detail record returned for its id.
    pub fn add_detail(&self, detail: CatalogDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.id.clone(), detail);
    }

    /// Delay responses for a search term, simulating a slow round trip.
    pub fn set_search_delay(&self, term: &str, millis: u64) {
        self.search_delays_ms
            .lock()
            .unwrap()
            .insert(term.to_string(), millis);
    }

    /// Delay responses for a detail id.
    pub fn set_detail_delay(&self, id: &str, millis: u64) {
        self.detail_delays_ms
            .lock()
            .unwrap()
            .insert(id.to_string(), millis);
    }

    /// Fail the next search with the given error.
    pub fn set_next_search_error(&self, error: CatalogError) {
        *self.next_search_error.lock().unwrap() = Some(error);
    }

    /// Fail the next lookup with the given error.
    pub fn set_next_lookup_error(&self, error: CatalogError) {
        *self.next_lookup_error.lock().unwrap() = Some(error);
    }

    /// Terms searched so far, in call order.
    pub fn recorded_searches(&self) -> Vec<String> {
        self.recorded_searches.lock().unwrap().clone()
    }

    /// Ids looked up so far, in call order.
    pub fn recorded_lookups(&self) -> Vec<String> {
        self.recorded_lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn search(&self, term: &str) -> Result<Vec<CatalogSummary>, CatalogError> {
        self.recorded_searches.lock().unwrap().push(term.to_string());

        let delay = self.search_delays_ms.lock().unwrap().get(term).copied();
        if let Some(millis) = delay {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        if let Some(error) = self.next_search_error.lock().unwrap().take() {
            return Err(error);
        }

        match self.search_results.lock().unwrap().get(term) {
            Some(results) => Ok(results.clone()),
            None => Err(CatalogError::NotFound("Movie not found!".to_string())),
        }
    }

    async fn lookup(&self, id: &str) -> Result<CatalogDetail, CatalogError> {
        self.recorded_lookups.lock().unwrap().push(id.to_string());

        let delay = self.detail_delays_ms.lock().unwrap().get(id).copied();
        if let Some(millis) = delay {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        if let Some(error) = self.next_lookup_error.lock().unwrap().take() {
            return Err(error);
        }

        match self.details.lock().unwrap().get(id) {
            Some(detail) => Ok(detail.clone()),
            None => Err(CatalogError::NotFound(id.to_string())),
        }
    }
}
