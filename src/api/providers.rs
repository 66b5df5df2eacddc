//! Direct, single-provider lookups. Payloads are returned in the provider's
//! own shape: `AniList` GraphQL media or Kitsu JSON:API resources.

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;
use std::sync::Arc;

use super::anime::MediaQueryParams;
use super::{ApiError, AppState};
use crate::domain::MediaQuery;

pub async fn get_anilist(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MediaQueryParams>,
) -> Result<Json<Value>, ApiError> {
    let query = MediaQuery::from_params(&params.media_params())?;
    let payload = state.anilist().fetch_media(&query).await?;
    Ok(Json(payload))
}

pub async fn get_kitsu(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MediaQueryParams>,
) -> Result<Json<Value>, ApiError> {
    let query = MediaQuery::from_params(&params.media_params())?;
    let payload = state.kitsu().fetch_anime(&query).await?;
    Ok(Json(payload))
}
