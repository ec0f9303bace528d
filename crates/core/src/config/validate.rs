use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog api_key is non-empty and base_url is set
/// - Server port is not 0
/// - Rating scale has at least one star
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.api_key cannot be empty".to_string(),
        ));
    }

    if config.catalog.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.base_url cannot be empty".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.rating.max_rating == 0 {
        return Err(ConfigError::ValidationError(
            "rating.max_rating must be at least 1".to_string(),
        ));
    }

    Ok(())
}
