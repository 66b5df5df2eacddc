//! Domain service for episodes and per-user watch progress.

use crate::models::episode::{
    Episode, EpisodeDetail, EpisodeList, NewEpisode, SeasonEpisodes, WatchHistoryEntry,
    WatchProgress,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for EpisodeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait EpisodeService: Send + Sync {
    /// Every episode of an anime grouped by season.
    async fn list(&self, anime_id: &str) -> Result<EpisodeList, EpisodeError>;

    /// One episode with its anime summary and the viewer's progress.
    async fn detail(&self, episode_id: &str, viewer_id: &str)
    -> Result<EpisodeDetail, EpisodeError>;

    async fn season(&self, anime_id: &str, season: i32) -> Result<SeasonEpisodes, EpisodeError>;

    /// Upserts the (user, episode) watch-history row.
    async fn record_progress(
        &self,
        episode_id: &str,
        progress: WatchProgress,
    ) -> Result<WatchHistoryEntry, EpisodeError>;

    async fn create(&self, episode: NewEpisode) -> Result<Episode, EpisodeError>;
}
