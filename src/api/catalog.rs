use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_anilist_id;
use super::{ApiError, AppState};
use crate::models::catalog::{CatalogAnime, NewCatalogAnime};

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
}

/// Search results when `q` is given, the most popular entries otherwise.
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<CatalogAnime>>, ApiError> {
    let results = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => state.library().search_anime(q).await?,
        None => state.library().popular_anime().await?,
    };
    Ok(Json(results))
}

pub async fn create_catalog_anime(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCatalogAnime>,
) -> Result<(StatusCode, Json<CatalogAnime>), ApiError> {
    let anime = state.library().create_anime(payload).await?;
    Ok((StatusCode::CREATED, Json(anime)))
}

pub async fn get_catalog_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CatalogAnime>, ApiError> {
    Ok(Json(state.library().get_anime(&id).await?))
}

pub async fn get_catalog_anime_by_anilist_id(
    State(state): State<Arc<AppState>>,
    Path(anilist_id): Path<i32>,
) -> Result<Json<CatalogAnime>, ApiError> {
    let anilist_id = validate_anilist_id(anilist_id)?;
    Ok(Json(
        state.library().get_anime_by_anilist_id(anilist_id).await?,
    ))
}

pub async fn list_catalog_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.library().genres().await?))
}
