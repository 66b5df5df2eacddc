use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{new_id, now};
use crate::entities::{anime, episodes};
use crate::models::episode::NewEpisode;

/// Repository for episode rows
pub struct EpisodeRepository {
    conn: DatabaseConnection,
}

impl EpisodeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: &NewEpisode) -> Result<episodes::Model> {
        let model = episodes::ActiveModel {
            id: Set(new_id()),
            anime_id: Set(input.anime_id.clone()),
            number: Set(input.number),
            season: Set(input.season),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            thumbnail: Set(input.thumbnail.clone()),
            video_url: Set(input.video_url.clone()),
            duration: Set(input.duration),
            air_date: Set(input.air_date.clone()),
            created_at: Set(now()),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert episode")
    }

    pub async fn get(&self, id: &str) -> Result<Option<episodes::Model>> {
        episodes::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query episode by ID")
    }

    pub async fn get_with_anime(
        &self,
        id: &str,
    ) -> Result<Option<(episodes::Model, Option<anime::Model>)>> {
        episodes::Entity::find_by_id(id.to_string())
            .find_also_related(anime::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query episode by ID")
    }

    /// All episodes of an anime, ordered by season then number. Episodes
    /// without a season sort first.
    pub async fn list_for_anime(
        &self,
        anime_id: &str,
    ) -> Result<Vec<(episodes::Model, Option<anime::Model>)>> {
        episodes::Entity::find()
            .filter(episodes::Column::AnimeId.eq(anime_id))
            .order_by_asc(episodes::Column::Season)
            .order_by_asc(episodes::Column::Number)
            .find_also_related(anime::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list episodes")
    }

    pub async fn list_for_season(
        &self,
        anime_id: &str,
        season: i32,
    ) -> Result<Vec<episodes::Model>> {
        episodes::Entity::find()
            .filter(episodes::Column::AnimeId.eq(anime_id))
            .filter(episodes::Column::Season.eq(season))
            .order_by_asc(episodes::Column::Number)
            .all(&self.conn)
            .await
            .context("Failed to list season episodes")
    }
}
