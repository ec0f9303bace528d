//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Fetch pipelines (runs, suppressed outcomes, errors)
//! - Watched collection (size, persistence failures)
//!
//! Registration into a registry happens at the server edge.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts};

/// Fetch runs dispatched, by pipeline ("search", "detail").
///
/// Sentinel resets do not count; they issue no request.
pub static FETCH_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("screenroom_fetch_runs_total", "Total fetch requests dispatched"),
        &["pipeline"],
    )
    .unwrap()
});

/// Superseded fetch outcomes discarded at commit time.
pub static FETCHES_SUPPRESSED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "screenroom_fetches_suppressed_total",
            "Fetch outcomes discarded because a newer key superseded them",
        ),
        &["pipeline"],
    )
    .unwrap()
});

/// Committed fetch failures by pipeline and kind ("not_found", "transport").
pub static FETCH_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("screenroom_fetch_errors_total", "Committed fetch failures"),
        &["pipeline", "kind"],
    )
    .unwrap()
});

/// Current number of entries in the watched collection.
pub static WATCHED_COLLECTION_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "screenroom_watched_collection_size",
        "Number of entries in the watched collection",
    )
    .unwrap()
});

/// Durable store writes that failed.
pub static STORE_WRITE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "screenroom_store_write_failures_total",
        "Durable collection store writes that failed",
    )
    .unwrap()
});
