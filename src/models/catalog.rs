use super::anime::AnimeTitle;
use crate::entities::anime;
use serde::{Deserialize, Serialize};

/// An anime row from the local catalog, as served by the catalog routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAnime {
    pub id: String,
    pub anilist_id: Option<i32>,
    pub kitsu_id: Option<String>,
    pub title: AnimeTitle,
    pub cover_image: String,
    pub banner_image: Option<String>,
    pub synopsis: Option<String>,
    pub episodes: Option<i32>,
    pub status: Option<String>,
    pub genres: Vec<String>,
    pub studio: Option<String>,
    pub rating: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<anime::Model> for CatalogAnime {
    fn from(m: anime::Model) -> Self {
        Self {
            id: m.id,
            anilist_id: m.anilist_id,
            kitsu_id: m.kitsu_id,
            title: serde_json::from_str(&m.title_json).unwrap_or_default(),
            cover_image: m.cover_image,
            banner_image: m.banner_image,
            synopsis: m.synopsis,
            episodes: m.episodes,
            status: m.status,
            genres: serde_json::from_str(&m.genres_json).unwrap_or_default(),
            studio: m.studio,
            rating: m.rating,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Payload for adding an anime to the local catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCatalogAnime {
    pub anilist_id: Option<i32>,
    pub kitsu_id: Option<String>,
    pub title: AnimeTitle,
    pub cover_image: String,
    pub banner_image: Option<String>,
    pub synopsis: Option<String>,
    pub episodes: Option<i32>,
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub studio: Option<String>,
    pub rating: Option<f64>,
}

impl NewCatalogAnime {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.preferred().is_none_or(|t| t.trim().is_empty()) {
            return Err("Anime title required".to_string());
        }
        if self.cover_image.trim().is_empty() {
            return Err("Cover image required".to_string());
        }
        if let Some(rating) = self.rating
            && !(0.0..=10.0).contains(&rating)
        {
            return Err(format!("Rating must be between 0 and 10, got {rating}"));
        }
        Ok(())
    }
}

/// Case-insensitive substring match over every title variant and the synopsis.
#[must_use]
pub fn matches_query(anime: &CatalogAnime, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    [
        anime.title.english.as_deref(),
        anime.title.romaji.as_deref(),
        anime.title.native.as_deref(),
        anime.synopsis.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}
