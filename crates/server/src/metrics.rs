//! Prometheus metrics for observability.
//!
//! HTTP request metrics live here; the core crate's pipeline and
//! collection metrics are registered into the same registry so one
//! scrape sees everything.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use screenroom_core::metrics::{
    FETCHES_SUPPRESSED_TOTAL, FETCH_ERRORS_TOTAL, FETCH_RUNS_TOTAL, STORE_WRITE_FAILURES_TOTAL,
    WATCHED_COLLECTION_SIZE,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "screenroom_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("screenroom_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "screenroom_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .expect("register http duration");
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("register http totals");
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .expect("register http in flight");
    registry
        .register(Box::new(FETCH_RUNS_TOTAL.clone()))
        .expect("register fetch runs");
    registry
        .register(Box::new(FETCHES_SUPPRESSED_TOTAL.clone()))
        .expect("register fetches suppressed");
    registry
        .register(Box::new(FETCH_ERRORS_TOTAL.clone()))
        .expect("register fetch errors");
    registry
        .register(Box::new(WATCHED_COLLECTION_SIZE.clone()))
        .expect("register collection size");
    registry
        .register(Box::new(STORE_WRITE_FAILURES_TOTAL.clone()))
        .expect("register store failures");
}

/// Collapse id-bearing path segments so label cardinality stays bounded.
pub fn normalize_path(path: &str) -> String {
    match path.strip_prefix("/api/v1/watched/") {
        Some(rest) if !rest.is_empty() => "/api/v1/watched/{id}".to_string(),
        _ => path.to_string(),
    }
}

/// Render the registry in Prometheus text exposition format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_watched_id_paths() {
        assert_eq!(
            normalize_path("/api/v1/watched/tt1375666"),
            "/api/v1/watched/{id}"
        );
        assert_eq!(normalize_path("/api/v1/watched"), "/api/v1/watched");
        assert_eq!(normalize_path("/api/v1/search"), "/api/v1/search");
    }
}
