//! `SeaORM` implementation of the `EpisodeService` trait.

use crate::db::Store;
use crate::models::episode::{
    AnimeSummary, DEFAULT_TOTAL_TIME, Episode, EpisodeDetail, EpisodeList, NewEpisode,
    SeasonEpisodes, WatchHistoryEntry, WatchProgress, WatchState,
};
use crate::services::episode_service::{EpisodeError, EpisodeService};
use async_trait::async_trait;
use tracing::debug;

pub struct SeaOrmEpisodeService {
    store: Store,
}

impl SeaOrmEpisodeService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EpisodeService for SeaOrmEpisodeService {
    async fn list(&self, anime_id: &str) -> Result<EpisodeList, EpisodeError> {
        let rows = self.store.list_episodes(anime_id).await?;
        let episodes = rows
            .into_iter()
            .map(|(episode, anime)| {
                let summary = anime.as_ref().map(AnimeSummary::from);
                Episode::from_model(episode, summary)
            })
            .collect();

        Ok(EpisodeList::group(anime_id.to_string(), episodes))
    }

    async fn detail(
        &self,
        episode_id: &str,
        viewer_id: &str,
    ) -> Result<EpisodeDetail, EpisodeError> {
        let (episode, anime) = self
            .store
            .get_episode_with_anime(episode_id)
            .await?
            .ok_or_else(|| EpisodeError::NotFound("Episode not found".into()))?;

        let watch_history = self
            .store
            .get_watch_history(viewer_id, episode_id)
            .await?
            .as_ref()
            .map(WatchState::from);

        Ok(EpisodeDetail {
            episode: Episode::from_model(episode, anime.as_ref().map(AnimeSummary::from)),
            watch_history,
        })
    }

    async fn season(&self, anime_id: &str, season: i32) -> Result<SeasonEpisodes, EpisodeError> {
        let episodes: Vec<Episode> = self
            .store
            .list_season_episodes(anime_id, season)
            .await?
            .into_iter()
            .map(|episode| Episode::from_model(episode, None))
            .collect();

        Ok(SeasonEpisodes {
            anime_id: anime_id.to_string(),
            season,
            total_episodes: episodes.len(),
            episodes,
        })
    }

    async fn record_progress(
        &self,
        episode_id: &str,
        progress: WatchProgress,
    ) -> Result<WatchHistoryEntry, EpisodeError> {
        let user_id = progress
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| EpisodeError::Validation("User ID required".into()))?;

        if self.store.get_episode(episode_id).await?.is_none() {
            return Err(EpisodeError::NotFound("Episode not found".into()));
        }
        if self.store.get_user(user_id).await?.is_none() {
            return Err(EpisodeError::NotFound(format!("User not found: {user_id}")));
        }

        let row = self
            .store
            .upsert_watch_history(
                user_id,
                episode_id,
                progress.watch_time,
                progress.completed.unwrap_or(false),
                DEFAULT_TOTAL_TIME,
            )
            .await?;

        debug!(
            user_id,
            episode_id,
            watch_time = row.watch_time,
            completed = row.completed,
            "Watch progress recorded"
        );
        Ok(WatchHistoryEntry::from(row))
    }

    async fn create(&self, episode: NewEpisode) -> Result<Episode, EpisodeError> {
        episode.validate().map_err(EpisodeError::Validation)?;

        let Some(anime) = self.store.get_anime(&episode.anime_id).await? else {
            return Err(EpisodeError::NotFound(format!(
                "Anime not found: {}",
                episode.anime_id
            )));
        };

        let created = self.store.create_episode(&episode).await?;
        Ok(Episode::from_model(created, Some(AnimeSummary::from(&anime))))
    }
}
