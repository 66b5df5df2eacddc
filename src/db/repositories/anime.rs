use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::BTreeSet;

use super::{is_unique_violation, new_id, now};
use crate::entities::anime;
use crate::models::catalog::{CatalogAnime, NewCatalogAnime, matches_query};

/// Repository for the local anime catalog
pub struct AnimeRepository {
    conn: DatabaseConnection,
}

impl AnimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn active_model(input: &NewCatalogAnime) -> Result<anime::ActiveModel> {
        let timestamp = now();
        Ok(anime::ActiveModel {
            id: Set(new_id()),
            anilist_id: Set(input.anilist_id),
            kitsu_id: Set(input.kitsu_id.clone()),
            title_json: Set(serde_json::to_string(&input.title)?),
            cover_image: Set(input.cover_image.clone()),
            banner_image: Set(input.banner_image.clone()),
            synopsis: Set(input.synopsis.clone()),
            episodes: Set(input.episodes),
            status: Set(input.status.clone()),
            genres_json: Set(serde_json::to_string(&input.genres)?),
            studio: Set(input.studio.clone()),
            rating: Set(input.rating),
            created_at: Set(timestamp.clone()),
            updated_at: Set(timestamp),
        })
    }

    /// Inserts an anime. Returns `None` when the `AniList` or Kitsu id is
    /// already in the catalog.
    pub async fn create(&self, input: &NewCatalogAnime) -> Result<Option<anime::Model>> {
        match Self::active_model(input)?.insert(&self.conn).await {
            Ok(created) => Ok(Some(created)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to insert anime"),
        }
    }

    /// Inserts or refreshes the row keyed by `AniList` id.
    pub async fn upsert_by_anilist_id(&self, input: &NewCatalogAnime) -> Result<anime::Model> {
        let Some(anilist_id) = input.anilist_id else {
            anyhow::bail!("Cannot upsert anime without an AniList ID");
        };

        let Some(existing) = self.get_by_anilist_id(anilist_id).await? else {
            return Self::active_model(input)?
                .insert(&self.conn)
                .await
                .context("Failed to insert anime");
        };

        let mut active = Self::active_model(input)?;
        active.id = Set(existing.id);
        active.created_at = Set(existing.created_at);
        active
            .update(&self.conn)
            .await
            .context("Failed to update anime")
    }

    pub async fn get(&self, id: &str) -> Result<Option<anime::Model>> {
        anime::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query anime by ID")
    }

    pub async fn get_by_anilist_id(&self, anilist_id: i32) -> Result<Option<anime::Model>> {
        anime::Entity::find()
            .filter(anime::Column::AnilistId.eq(anilist_id))
            .one(&self.conn)
            .await
            .context("Failed to query anime by AniList ID")
    }

    /// Title or synopsis substring search, best rated first.
    ///
    /// `LIKE` narrows the rows in SQL; the title match is then confirmed
    /// against the decoded title so JSON keys never match.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogAnime>> {
        let needle = query.trim();
        let rows = anime::Entity::find()
            .filter(
                Condition::any()
                    .add(anime::Column::TitleJson.contains(needle))
                    .add(anime::Column::Synopsis.contains(needle)),
            )
            .order_by_desc(anime::Column::Rating)
            .all(&self.conn)
            .await
            .context("Failed to search anime")?;

        Ok(rows
            .into_iter()
            .map(CatalogAnime::from)
            .filter(|anime| matches_query(anime, needle))
            .take(limit)
            .collect())
    }

    pub async fn popular(&self, limit: u64) -> Result<Vec<CatalogAnime>> {
        let rows = anime::Entity::find()
            .order_by_desc(anime::Column::Rating)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list popular anime")?;

        Ok(rows.into_iter().map(CatalogAnime::from).collect())
    }

    /// Every genre used in the catalog, deduplicated and sorted.
    pub async fn genres(&self) -> Result<Vec<String>> {
        let rows: Vec<String> = anime::Entity::find()
            .select_only()
            .column(anime::Column::GenresJson)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list genres")?;

        let genres: BTreeSet<String> = rows
            .iter()
            .flat_map(|raw| serde_json::from_str::<Vec<String>>(raw).unwrap_or_default())
            .collect();

        Ok(genres.into_iter().collect())
    }
}
