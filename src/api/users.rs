use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::models::user::{NewUser, UserProfile};

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let user = state.library().create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state.library().get_user(&id).await?;
    Ok(Json(user))
}
