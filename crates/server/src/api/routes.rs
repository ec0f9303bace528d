use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, session};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Search
        .route("/query", put(session::set_query))
        .route("/search", get(session::get_search))
        // Selection and detail
        .route("/selection", put(session::select))
        .route("/selection", delete(session::close_detail))
        .route("/detail", get(session::get_detail))
        // Rating
        .route("/rating", put(session::set_rating))
        .route("/rating/commit", post(session::commit_rating))
        // Watched collection
        .route("/watched", get(session::get_watched))
        .route("/watched/{id}", delete(session::delete_watched))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
