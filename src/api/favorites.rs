use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::required;
use super::watchlist::UserQuery;
use super::{ApiError, AppState, SuccessResponse};
use crate::models::user::{FavoriteEntry, UserAnimePair};

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<FavoriteEntry>>, ApiError> {
    let user_id = required(query.user_id.as_deref(), "User ID required")?;
    Ok(Json(state.library().favorites(user_id).await?))
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserAnimePair>,
) -> Result<(StatusCode, Json<FavoriteEntry>), ApiError> {
    let favorite = state.library().add_favorite(payload).await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Query(pair): Query<UserAnimePair>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.library().remove_favorite(pair).await?;
    Ok(Json(SuccessResponse::OK))
}
