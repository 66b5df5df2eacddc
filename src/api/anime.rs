use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::domain::MediaParams;
use crate::services::CatalogRequest;

/// Query string shared by the aggregation and provider routes.
#[derive(Debug, Default, Deserialize)]
pub struct MediaQueryParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub search: Option<String>,
    pub id: Option<String>,
    pub season: Option<String>,
    pub year: Option<String>,
    pub source: Option<String>,
    pub fallback: Option<String>,
}

impl MediaQueryParams {
    pub fn media_params(&self) -> MediaParams<'_> {
        MediaParams {
            kind: self.kind.as_deref(),
            search: self.search.as_deref(),
            id: self.id.as_deref(),
            season: self.season.as_deref(),
            year: self.year.as_deref(),
        }
    }
}

/// `AniList` first, normalized Kitsu when it is down.
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MediaQueryParams>,
) -> Result<Json<Value>, ApiError> {
    let request = CatalogRequest::from_params(
        &params.media_params(),
        params.source.as_deref(),
        params.fallback.as_deref(),
    )?;

    let payload = state.catalog().resolve(&request).await?;
    Ok(Json(payload))
}
