use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration.
///
/// All runtime knobs live here; nothing is read from ambient process
/// state after startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub rating: RatingConfig,
}

/// Remote catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// OMDb API key (required).
    pub api_key: String,
    /// Base URL of the catalog API.
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// HTTP timeout in seconds.
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u32,
}

fn default_catalog_base_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_catalog_timeout_secs() -> u32 {
    30
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("screenroom.db")
}

/// Rating configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatingConfig {
    /// Number of stars on the rating scale.
    #[serde(default = "default_max_rating")]
    pub max_rating: u32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            max_rating: default_max_rating(),
        }
    }
}

fn default_max_rating() -> u32 {
    10
}

/// Config view safe to expose over the API (api key redacted).
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog_base_url: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub rating: RatingConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog_base_url: config.catalog.base_url.clone(),
            server: config.server.clone(),
            database: config.database.clone(),
            rating: config.rating.clone(),
        }
    }
}
