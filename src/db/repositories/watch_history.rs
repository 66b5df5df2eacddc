use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::{new_id, now};
use crate::entities::watch_history;

pub struct WatchHistoryRepository {
    conn: DatabaseConnection,
}

impl WatchHistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(
        &self,
        user_id: &str,
        episode_id: &str,
    ) -> Result<Option<watch_history::Model>> {
        watch_history::Entity::find()
            .filter(watch_history::Column::UserId.eq(user_id))
            .filter(watch_history::Column::EpisodeId.eq(episode_id))
            .one(&self.conn)
            .await
            .context("Failed to query watch history")
    }

    /// Records playback for the (user, episode) pair. A first report creates
    /// the row with `total_time`; later ones only move `watch_time` and
    /// `completed`.
    pub async fn upsert(
        &self,
        user_id: &str,
        episode_id: &str,
        watch_time: i32,
        completed: bool,
        total_time: i32,
    ) -> Result<watch_history::Model> {
        let timestamp = now();
        let model = watch_history::ActiveModel {
            id: Set(new_id()),
            user_id: Set(user_id.to_string()),
            episode_id: Set(episode_id.to_string()),
            watch_time: Set(watch_time.max(0)),
            total_time: Set(total_time),
            completed: Set(completed),
            created_at: Set(timestamp.clone()),
            updated_at: Set(timestamp),
        };

        watch_history::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    watch_history::Column::UserId,
                    watch_history::Column::EpisodeId,
                ])
                .update_columns([
                    watch_history::Column::WatchTime,
                    watch_history::Column::Completed,
                    watch_history::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to upsert watch history")?;

        self.get(user_id, episode_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Watch history vanished after upsert"))
    }
}
