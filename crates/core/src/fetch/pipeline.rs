//! The fetch pipeline itself.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::metrics::{FETCHES_SUPPRESSED_TOTAL, FETCH_ERRORS_TOTAL, FETCH_RUNS_TOTAL};

use super::{FetchState, Fetcher};

/// One in-flight request per key change, latest key wins.
///
/// `run(Some(key))` supersedes any previous run: the superseded request
/// keeps executing (cancellation is cooperative, not preemptive) but its
/// outcome is discarded at commit time by a generation check performed
/// under the state lock. `run(None)` is the empty sentinel: it resets
/// the state synchronously and issues no request.
pub struct FetchPipeline<K, T> {
    /// Pipeline name, used as a metrics label ("search", "detail").
    name: &'static str,
    fetcher: Arc<dyn Fetcher<K, T>>,
    state: Arc<RwLock<FetchState<T>>>,
    /// Bumped on every `run`; a task may only commit while its own
    /// generation is still current.
    generation: Arc<AtomicU64>,
    /// Tasks spawned since the last `settle`.
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl<K, T> FetchPipeline<K, T>
where
    K: Debug + Send + Sync + 'static,
    T: Default + Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, fetcher: Arc<dyn Fetcher<K, T>>) -> Self {
        Self {
            name,
            fetcher,
            state: Arc::new(RwLock::new(FetchState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Drive the pipeline to a new key.
    ///
    /// Returns once the request has been dispatched (or the state reset,
    /// for the sentinel); the outcome lands asynchronously.
    pub async fn run(&self, key: Option<K>) {
        // Supersede any in-flight request before anything observable
        // happens for the new key.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(key) = key else {
            let mut state = self.state.write().await;
            if self.generation.load(Ordering::SeqCst) == generation {
                *state = FetchState::default();
            }
            return;
        };

        FETCH_RUNS_TOTAL.with_label_values(&[self.name]).inc();

        // Loading becomes visible synchronously, with data cleared, so no
        // observer ever sees a stale result paired with the new key. A
        // concurrent run may have superseded this one between the bump
        // and the lock acquisition; like the commit below, the write
        // only lands while this generation is still current, otherwise
        // it could erase a newer run's committed outcome.
        {
            let mut state = self.state.write().await;
            if self.generation.load(Ordering::SeqCst) == generation {
                *state = FetchState::loading();
            }
        }

        let name = self.name;
        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        let handle = tokio::spawn(async move {
            let outcome = fetcher.fetch(&key).await;

            let mut state = state.write().await;
            if current.load(Ordering::SeqCst) != generation {
                // Superseded by a newer key: swallow the outcome entirely.
                FETCHES_SUPPRESSED_TOTAL.with_label_values(&[name]).inc();
                debug!(pipeline = name, key = ?key, "Discarding superseded fetch outcome");
                return;
            }

            *state = match outcome {
                Ok(data) => FetchState::success(data),
                Err(e) => {
                    FETCH_ERRORS_TOTAL
                        .with_label_values(&[name, e.kind()])
                        .inc();
                    debug!(pipeline = name, key = ?key, error = %e, "Fetch failed");
                    FetchState::failed(e.to_string())
                }
            };
        });

        self.pending.lock().await.push(handle);
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> FetchState<T> {
        self.state.read().await.clone()
    }

    /// Await every task spawned so far, including superseded ones.
    ///
    /// After this returns, no pending network activity can mutate the
    /// state; used by tests and by graceful shutdown.
    pub async fn settle(&self) {
        let handles: Vec<_> = self.pending.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::fetch::FetchError;

    /// Fetcher with per-key canned results and per-key artificial latency.
    struct ScriptedFetcher {
        results: HashMap<String, Vec<String>>,
        delays_ms: HashMap<String, u64>,
        calls: AtomicU32,
    }

    impl ScriptedFetcher {
        fn new() -> Self {
            Self {
                results: HashMap::new(),
                delays_ms: HashMap::new(),
                calls: AtomicU32::new(0),
            }
        }

        fn with_result(mut self, key: &str, items: &[&str]) -> Self {
            self.results
                .insert(key.to_string(), items.iter().map(|s| s.to_string()).collect());
            self
        }

        fn with_delay(mut self, key: &str, millis: u64) -> Self {
            self.delays_ms.insert(key.to_string(), millis);
            self
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher<String, Vec<String>> for ScriptedFetcher {
        async fn fetch(&self, key: &String) -> Result<Vec<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(millis) = self.delays_ms.get(key) {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }
            match self.results.get(key) {
                Some(items) => Ok(items.clone()),
                None => Err(FetchError::NotFound("Movie not found".to_string())),
            }
        }
    }

    fn pipeline(fetcher: ScriptedFetcher) -> (Arc<ScriptedFetcher>, FetchPipeline<String, Vec<String>>) {
        let fetcher = Arc::new(fetcher);
        let pipeline = FetchPipeline::new("test", Arc::clone(&fetcher) as Arc<dyn Fetcher<_, _>>);
        (fetcher, pipeline)
    }

    #[tokio::test]
    async fn sentinel_resets_without_issuing_request() {
        let (fetcher, pipeline) = pipeline(ScriptedFetcher::new().with_result("dune", &["Dune"]));

        pipeline.run(Some("dune".to_string())).await;
        pipeline.settle().await;
        assert_eq!(pipeline.state().await.data, vec!["Dune".to_string()]);

        pipeline.run(None).await;
        pipeline.settle().await;

        let state = pipeline.state().await;
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn loading_is_visible_before_outcome() {
        let (_, pipeline) =
            pipeline(ScriptedFetcher::new().with_result("dune", &["Dune"]).with_delay("dune", 50));

        pipeline.run(Some("dune".to_string())).await;

        let state = pipeline.state().await;
        assert!(state.is_loading);
        assert!(state.error.is_none());
        assert!(state.data.is_empty());

        pipeline.settle().await;
        let state = pipeline.state().await;
        assert!(!state.is_loading);
        assert_eq!(state.data, vec!["Dune".to_string()]);
    }

    #[tokio::test]
    async fn handled_not_found_sets_error_and_clears_loading() {
        let (_, pipeline) = pipeline(ScriptedFetcher::new());

        pipeline.run(Some("zzzqqq123".to_string())).await;
        pipeline.settle().await;

        let state = pipeline.state().await;
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("Movie not found"));
    }

    #[tokio::test]
    async fn latest_key_wins_even_when_earlier_response_arrives_last() {
        // "i" and "in" are slower than "inception"; their responses
        // arrive after the final key's and must be discarded.
        let (fetcher, pipeline) = pipeline(
            ScriptedFetcher::new()
                .with_result("i", &["It"])
                .with_delay("i", 80)
                .with_result("in", &["Inside Out"])
                .with_delay("in", 60)
                .with_result("inception", &["Inception"]),
        );

        pipeline.run(Some("i".to_string())).await;
        pipeline.run(Some("in".to_string())).await;
        pipeline.run(Some("inception".to_string())).await;
        pipeline.settle().await;

        let state = pipeline.state().await;
        assert_eq!(state.data, vec!["Inception".to_string()]);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        // All three requests were dispatched; only the last one committed.
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn superseded_failure_is_fully_swallowed() {
        // The slow key has no scripted result and would commit an error,
        // but it is superseded before its outcome lands.
        let (_, pipeline) = pipeline(
            ScriptedFetcher::new()
                .with_delay("missing", 60)
                .with_result("dune", &["Dune"]),
        );

        pipeline.run(Some("missing".to_string())).await;
        pipeline.run(Some("dune".to_string())).await;
        pipeline.settle().await;

        let state = pipeline.state().await;
        assert_eq!(state.data, vec!["Dune".to_string()]);
        assert!(state.error.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_runs_never_strand_the_loading_state() {
        // Two runs racing from separate tasks: a run superseded between
        // its generation bump and its loading write must not overwrite
        // the newer run's committed outcome.
        for _ in 0..200 {
            let (_, pipeline) = pipeline(
                ScriptedFetcher::new()
                    .with_result("dune", &["Dune"])
                    .with_result("tron", &["Tron"]),
            );
            let pipeline = Arc::new(pipeline);

            let first = {
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(async move { pipeline.run(Some("dune".to_string())).await })
            };
            let second = {
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(async move { pipeline.run(Some("tron".to_string())).await })
            };
            let _ = first.await;
            let _ = second.await;
            pipeline.settle().await;

            let state = pipeline.state().await;
            assert!(!state.is_loading);
            assert!(state.error.is_none());
            assert!(
                state.data == vec!["Dune".to_string()] || state.data == vec!["Tron".to_string()],
                "state holds neither run's outcome: {:?}",
                state.data
            );
        }
    }

    #[tokio::test]
    async fn sentinel_mid_flight_suppresses_pending_outcome() {
        let (_, pipeline) =
            pipeline(ScriptedFetcher::new().with_result("dune", &["Dune"]).with_delay("dune", 60));

        pipeline.run(Some("dune".to_string())).await;
        pipeline.run(None).await;
        pipeline.settle().await;

        let state = pipeline.state().await;
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }
}
