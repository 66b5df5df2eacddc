use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{is_unique_violation, new_id, now};
use crate::entities::{anime, watchlist};
use crate::models::user::{NewWatchlistEntry, WatchlistUpdate};

pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_pair(&self, user_id: &str, anime_id: &str) -> Result<Option<watchlist::Model>> {
        watchlist::Entity::find()
            .filter(watchlist::Column::UserId.eq(user_id))
            .filter(watchlist::Column::AnimeId.eq(anime_id))
            .one(&self.conn)
            .await
            .context("Failed to query watchlist entry")
    }

    /// Returns `None` when the user already tracks this anime.
    pub async fn add(&self, entry: &NewWatchlistEntry) -> Result<Option<watchlist::Model>> {
        if self.find_pair(&entry.user_id, &entry.anime_id).await?.is_some() {
            return Ok(None);
        }

        let timestamp = now();
        let model = watchlist::ActiveModel {
            id: Set(new_id()),
            user_id: Set(entry.user_id.clone()),
            anime_id: Set(entry.anime_id.clone()),
            status: Set(entry.status.as_str().to_string()),
            progress: Set(entry.progress.max(0)),
            created_at: Set(timestamp.clone()),
            updated_at: Set(timestamp),
        };

        match model.insert(&self.conn).await {
            Ok(created) => Ok(Some(created)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to insert watchlist entry"),
        }
    }

    /// Applies the present fields of `update`. `None` when the entry is gone.
    pub async fn update(
        &self,
        id: &str,
        update: &WatchlistUpdate,
    ) -> Result<Option<watchlist::Model>> {
        let Some(existing) = watchlist::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query watchlist entry by ID")?
        else {
            return Ok(None);
        };

        let mut active: watchlist::ActiveModel = existing.into();
        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(progress) = update.progress {
            active.progress = Set(progress.max(0));
        }
        active.updated_at = Set(now());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update watchlist entry")?;
        Ok(Some(updated))
    }

    /// Number of rows removed.
    pub async fn remove(&self, user_id: &str, anime_id: &str) -> Result<u64> {
        let result = watchlist::Entity::delete_many()
            .filter(watchlist::Column::UserId.eq(user_id))
            .filter(watchlist::Column::AnimeId.eq(anime_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove watchlist entry")?;
        Ok(result.rows_affected)
    }

    /// Entries for a user, newest first, each with its anime.
    pub async fn list_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(watchlist::Model, Option<anime::Model>)>> {
        watchlist::Entity::find()
            .filter(watchlist::Column::UserId.eq(user_id))
            .order_by_desc(watchlist::Column::CreatedAt)
            .find_also_related(anime::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list watchlist")
    }
}
