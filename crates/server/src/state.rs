use screenroom_core::{Config, SanitizedConfig, Session};

/// Shared application state.
///
/// Holds exactly one session: the server is a single-user surface, so
/// every request drives the same query/selection/collection state.
pub struct AppState {
    config: Config,
    session: Session,
}

impl AppState {
    pub fn new(config: Config, session: Session) -> Self {
        Self { config, session }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
