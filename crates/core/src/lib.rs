pub mod catalog;
pub mod config;
pub mod fetch;
pub mod metrics;
pub mod rating;
pub mod session;
pub mod storage;
pub mod testing;
pub mod watched;

pub use catalog::{CatalogClient, CatalogDetail, CatalogError, CatalogSummary, OmdbClient};
pub use config::{
    load_config, load_config_from_str, validate_config, CatalogConfig, Config, ConfigError,
    DatabaseConfig, RatingConfig, SanitizedConfig, ServerConfig,
};
pub use fetch::{FetchError, FetchPipeline, FetchState, Fetcher};
pub use rating::{RatingError, RatingGate, RatingView};
pub use session::{Session, SessionError};
pub use storage::{CollectionStore, SqliteStore, StoreError};
pub use watched::{WatchedCollection, WatchedEntry, WatchedError, WatchedSummary};
