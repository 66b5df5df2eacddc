use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::required;
use super::{ApiError, AppState, SuccessResponse};
use crate::models::user::{NewWatchlistEntry, UserAnimePair, WatchlistEntry, WatchlistUpdate};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<WatchlistEntry>>, ApiError> {
    let user_id = required(query.user_id.as_deref(), "User ID required")?;
    Ok(Json(state.library().watchlist(user_id).await?))
}

pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewWatchlistEntry>,
) -> Result<(StatusCode, Json<WatchlistEntry>), ApiError> {
    let entry = state.library().add_to_watchlist(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_watchlist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<WatchlistUpdate>,
) -> Result<Json<WatchlistEntry>, ApiError> {
    Ok(Json(state.library().update_watchlist(&id, payload).await?))
}

pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    Query(pair): Query<UserAnimePair>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.library().remove_from_watchlist(pair).await?;
    Ok(Json(SuccessResponse::OK))
}
