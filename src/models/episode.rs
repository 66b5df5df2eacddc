use super::anime::AnimeTitle;
use crate::entities::{episodes, watch_history};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Runtime assumed for a first watch-history row, in seconds.
pub const DEFAULT_TOTAL_TIME: i32 = 1440;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub anime_id: String,
    pub number: i32,
    pub season: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub air_date: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anime: Option<AnimeSummary>,
}

impl Episode {
    pub fn from_model(m: episodes::Model, anime: Option<AnimeSummary>) -> Self {
        Self {
            id: m.id,
            anime_id: m.anime_id,
            number: m.number,
            season: m.season,
            title: m.title,
            description: m.description,
            thumbnail: m.thumbnail,
            video_url: m.video_url,
            duration: m.duration,
            air_date: m.air_date,
            created_at: m.created_at,
            anime,
        }
    }
}

/// The parent anime fields carried alongside an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeSummary {
    pub id: String,
    pub title: AnimeTitle,
    pub cover_image: String,
}

impl From<&crate::entities::anime::Model> for AnimeSummary {
    fn from(m: &crate::entities::anime::Model) -> Self {
        Self {
            id: m.id.clone(),
            title: serde_json::from_str(&m.title_json).unwrap_or_default(),
            cover_image: m.cover_image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeList {
    pub anime_id: String,
    /// Keyed by season number; episodes without a season sit under `0`.
    pub episodes_by_season: BTreeMap<i32, Vec<Episode>>,
    pub total_episodes: usize,
}

impl EpisodeList {
    /// Groups episodes already ordered by season then number.
    pub fn group(anime_id: String, episodes: Vec<Episode>) -> Self {
        let total_episodes = episodes.len();
        let mut episodes_by_season: BTreeMap<i32, Vec<Episode>> = BTreeMap::new();
        for episode in episodes {
            episodes_by_season
                .entry(episode.season.unwrap_or(0))
                .or_default()
                .push(episode);
        }

        Self {
            anime_id,
            episodes_by_season,
            total_episodes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonEpisodes {
    pub anime_id: String,
    pub season: i32,
    pub episodes: Vec<Episode>,
    pub total_episodes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDetail {
    #[serde(flatten)]
    pub episode: Episode,
    pub watch_history: Option<WatchState>,
}

/// Playback position of one user on one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchState {
    pub watch_time: i32,
    pub total_time: i32,
    pub completed: bool,
}

impl From<&watch_history::Model> for WatchState {
    fn from(m: &watch_history::Model) -> Self {
        Self {
            watch_time: m.watch_time,
            total_time: m.total_time,
            completed: m.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    pub id: String,
    pub user_id: String,
    pub episode_id: String,
    pub watch_time: i32,
    pub total_time: i32,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<watch_history::Model> for WatchHistoryEntry {
    fn from(m: watch_history::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            episode_id: m.episode_id,
            watch_time: m.watch_time,
            total_time: m.total_time,
            completed: m.completed,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Body of a watch-progress report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgress {
    pub user_id: Option<String>,
    #[serde(default)]
    pub watch_time: i32,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEpisode {
    #[serde(default)]
    pub anime_id: String,
    pub number: i32,
    pub season: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub air_date: Option<String>,
}

impl NewEpisode {
    pub fn validate(&self) -> Result<(), String> {
        if self.anime_id.trim().is_empty() {
            return Err("Anime ID required".to_string());
        }
        if self.number < 1 {
            return Err(format!("Episode number must be positive, got {}", self.number));
        }
        if self.season.is_some_and(|s| s < 0) {
            return Err("Season must not be negative".to_string());
        }
        if self.duration.is_some_and(|d| d < 0) {
            return Err("Duration must not be negative".to_string());
        }
        Ok(())
    }
}
