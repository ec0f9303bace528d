//! Session intent handlers.
//!
//! Each mutating intent drives the shared session and waits for pending
//! fetch activity to settle before replying, so responses are
//! deterministic. The race-safety machinery in the core still governs
//! interleaved intents: whichever intent arrives last wins.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use screenroom_core::{
    CatalogDetail, CatalogSummary, FetchState, RatingError, RatingView, SessionError, WatchedEntry,
    WatchedSummary,
};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct SetQueryRequest {
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRatingRequest {
    pub value: u32,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub selection: Option<String>,
    pub detail: FetchState<Option<CatalogDetail>>,
    pub rating: RatingView,
}

#[derive(Debug, Serialize)]
pub struct WatchedResponse {
    pub entries: Vec<WatchedEntry>,
    pub summary: WatchedSummary,
}

pub async fn set_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetQueryRequest>,
) -> Json<FetchState<Vec<CatalogSummary>>> {
    let session = state.session();
    session.set_query(&request.term).await;
    session.settle().await;
    Json(session.search_state().await)
}

pub async fn get_search(
    State(state): State<Arc<AppState>>,
) -> Json<FetchState<Vec<CatalogSummary>>> {
    Json(state.session().search_state().await)
}

pub async fn select(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectRequest>,
) -> Json<DetailResponse> {
    let session = state.session();
    session.select(&request.id).await;
    session.settle().await;
    Json(detail_response(state.as_ref()).await)
}

pub async fn close_detail(State(state): State<Arc<AppState>>) -> Json<DetailResponse> {
    state.session().close_detail().await;
    Json(detail_response(state.as_ref()).await)
}

pub async fn get_detail(State(state): State<Arc<AppState>>) -> Json<DetailResponse> {
    Json(detail_response(state.as_ref()).await)
}

async fn detail_response(state: &AppState) -> DetailResponse {
    let session = state.session();
    DetailResponse {
        selection: session.selection().await,
        detail: session.detail_state().await,
        rating: session.rating_view().await,
    }
}

pub async fn set_rating(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetRatingRequest>,
) -> Result<Json<RatingView>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.session();
    match session.set_rating(request.value).await {
        Ok(()) => Ok(Json(session.rating_view().await)),
        Err(e @ RatingError::Locked) => Err(error_response(StatusCode::CONFLICT, e.to_string())),
        Err(e @ RatingError::OutOfRange { .. }) => {
            Err(error_response(StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

pub async fn commit_rating(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WatchedEntry>, (StatusCode, Json<ErrorResponse>)> {
    match state.session().commit_rating().await {
        Ok(entry) => Ok(Json(entry)),
        Err(e @ SessionError::AlreadyWatched) => {
            Err(error_response(StatusCode::CONFLICT, e.to_string()))
        }
        Err(e @ (SessionError::NoSelection
        | SessionError::DetailNotLoaded
        | SessionError::NoRating
        | SessionError::Rating(_))) => Err(error_response(StatusCode::BAD_REQUEST, e.to_string())),
        Err(e @ SessionError::Store(_)) => {
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub async fn get_watched(State(state): State<Arc<AppState>>) -> Json<WatchedResponse> {
    let session = state.session();
    Json(WatchedResponse {
        entries: session.watched_entries().await,
        summary: session.watched_summary().await,
    })
}

pub async fn delete_watched(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.session().delete_watched(&id).await {
        // Deletion is idempotent: absent ids succeed too.
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
