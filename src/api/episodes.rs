use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{required, validate_season};
use super::{ApiError, AppState, WatchProgressResponse};
use crate::models::episode::{Episode, NewEpisode, WatchProgress};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub anime_id: Option<String>,
    pub episode_id: Option<String>,
    pub season: Option<String>,
}

pub async fn get_episodes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EpisodeParams>,
) -> Result<Response, ApiError> {
    match params.kind.as_deref() {
        Some("list") => {
            let anime_id = required(params.anime_id.as_deref(), "Anime ID required")?;
            let list = state.episodes().list(anime_id).await?;
            Ok(Json(list).into_response())
        }
        Some("detail") => {
            let episode_id = required(params.episode_id.as_deref(), "Episode ID required")?;
            let detail = state
                .episodes()
                .detail(episode_id, state.placeholder_user_id())
                .await?;
            Ok(Json(detail).into_response())
        }
        Some("season") => {
            let message = "Anime ID and season required";
            let anime_id = required(params.anime_id.as_deref(), message)?;
            let season = validate_season(required(params.season.as_deref(), message)?)?;
            let episodes = state.episodes().season(anime_id, season).await?;
            Ok(Json(episodes).into_response())
        }
        _ => Err(ApiError::validation("Invalid type parameter")),
    }
}

pub async fn record_progress(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EpisodeParams>,
    Json(progress): Json<WatchProgress>,
) -> Result<Json<WatchProgressResponse>, ApiError> {
    let episode_id = required(params.episode_id.as_deref(), "Episode ID required")?;
    let watch_history = state
        .episodes()
        .record_progress(episode_id, progress)
        .await?;

    Ok(Json(WatchProgressResponse {
        success: true,
        watch_history,
    }))
}

pub async fn create_episode(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewEpisode>,
) -> Result<(StatusCode, Json<Episode>), ApiError> {
    let episode = state.episodes().create(payload).await?;
    Ok((StatusCode::CREATED, Json(episode)))
}
