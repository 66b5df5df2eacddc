use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_page;
use super::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct GenreParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub genre: Option<String>,
    pub page: Option<String>,
}

/// `?type=genres` lists every genre; `?type=anime&genre=` pages through one.
pub async fn get_genres(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenreParams>,
) -> Result<Response, ApiError> {
    let genre = params.genre.as_deref().map(str::trim).filter(|g| !g.is_empty());

    match (params.kind.as_deref(), genre) {
        (Some("genres"), _) => {
            let genres = state.anilist().genres().await?;
            Ok(Json(genres).into_response())
        }
        (Some("anime"), Some(genre)) => {
            let page = validate_page(params.page.as_deref())?;
            let result = state.anilist().anime_by_genre(genre, page).await?;
            Ok(Json(result).into_response())
        }
        _ => Err(ApiError::validation(
            "Invalid parameters. Use ?type=genres or ?type=anime&genre={name}",
        )),
    }
}
