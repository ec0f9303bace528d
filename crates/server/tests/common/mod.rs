//! Shared in-process test harness.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use screenroom_core::testing::MockCatalogClient;
use screenroom_core::{
    CatalogConfig, CollectionStore, Config, DatabaseConfig, RatingConfig, ServerConfig, Session,
    SqliteStore,
};
use screenroom_server::api::create_router;
use screenroom_server::state::AppState;

pub use screenroom_core::testing::fixtures;

/// In-process server over a mock catalog and a temp-file store.
pub struct TestFixture {
    pub router: Router,
    /// Mock catalog - configure search results and detail records.
    pub catalog: Arc<MockCatalogClient>,
    /// Holds the test database alive for the fixture's lifetime.
    #[allow(dead_code)]
    pub temp_dir: TempDir,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let catalog = Arc::new(MockCatalogClient::new());
        let store: Arc<dyn CollectionStore> =
            Arc::new(SqliteStore::new(&db_path).expect("Failed to create store"));

        let config = Config {
            catalog: CatalogConfig {
                api_key: "test-key".to_string(),
                base_url: "https://www.omdbapi.com".to_string(),
                timeout_secs: 5,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            rating: RatingConfig { max_rating: 10 },
        };

        let session = Session::new(
            Arc::clone(&catalog) as Arc<dyn screenroom_core::CatalogClient>,
            store,
            config.rating.max_rating,
        );

        let state = Arc::new(AppState::new(config, session));
        let router = create_router(state);

        Self {
            router,
            catalog,
            temp_dir,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).to_string(),
            ))
        };

        TestResponse { status, body }
    }
}
