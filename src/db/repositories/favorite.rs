use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{is_unique_violation, new_id, now};
use crate::entities::{anime, favorites};

pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `None` when the anime is already a favorite of the user.
    pub async fn add(&self, user_id: &str, anime_id: &str) -> Result<Option<favorites::Model>> {
        let existing = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::AnimeId.eq(anime_id))
            .one(&self.conn)
            .await
            .context("Failed to query favorite")?;
        if existing.is_some() {
            return Ok(None);
        }

        let model = favorites::ActiveModel {
            id: Set(new_id()),
            user_id: Set(user_id.to_string()),
            anime_id: Set(anime_id.to_string()),
            created_at: Set(now()),
        };

        match model.insert(&self.conn).await {
            Ok(created) => Ok(Some(created)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to insert favorite"),
        }
    }

    pub async fn remove(&self, user_id: &str, anime_id: &str) -> Result<u64> {
        let result = favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::AnimeId.eq(anime_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove favorite")?;
        Ok(result.rows_affected)
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(favorites::Model, Option<anime::Model>)>> {
        favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .order_by_desc(favorites::Column::CreatedAt)
            .find_also_related(anime::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list favorites")
    }
}
