//! `SeaORM` implementation of the `LibraryService` trait.

use crate::db::Store;
use crate::models::catalog::{CatalogAnime, NewCatalogAnime};
use crate::models::user::{
    FavoriteEntry, NewUser, NewWatchlistEntry, UserAnimePair, UserProfile, WatchlistEntry,
    WatchlistUpdate,
};
use crate::services::library_service::{LibraryError, LibraryService};
use async_trait::async_trait;
use tracing::info;

const SEARCH_LIMIT: usize = 20;
const POPULAR_LIMIT: u64 = 12;

pub struct SeaOrmLibraryService {
    store: Store,
}

impl SeaOrmLibraryService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn require_user(&self, id: &str) -> Result<(), LibraryError> {
        if self.store.get_user(id).await?.is_none() {
            return Err(LibraryError::NotFound(format!("User not found: {id}")));
        }
        Ok(())
    }

    async fn require_anime(&self, id: &str) -> Result<CatalogAnime, LibraryError> {
        self.store
            .get_anime(id)
            .await?
            .map(CatalogAnime::from)
            .ok_or_else(|| LibraryError::NotFound(format!("Anime not found: {id}")))
    }
}

#[async_trait]
impl LibraryService for SeaOrmLibraryService {
    async fn create_user(&self, user: NewUser) -> Result<UserProfile, LibraryError> {
        user.validate().map_err(LibraryError::Validation)?;

        let created = self.store.create_user(&user).await?.ok_or_else(|| {
            LibraryError::Conflict("A user with this email or username already exists".into())
        })?;

        info!(user_id = %created.id, username = %created.username, "User created");
        Ok(UserProfile::from(created))
    }

    async fn get_user(&self, id: &str) -> Result<UserProfile, LibraryError> {
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(format!("User not found: {id}")))?;

        let watchlist = self.watchlist(id).await?;
        let favorites = self.favorites(id).await?;

        let mut profile = UserProfile::from(user);
        profile.watchlist = Some(watchlist);
        profile.favorites = Some(favorites);
        Ok(profile)
    }

    async fn create_anime(&self, anime: NewCatalogAnime) -> Result<CatalogAnime, LibraryError> {
        anime.validate().map_err(LibraryError::Validation)?;

        let created = self.store.add_anime(&anime).await?.ok_or_else(|| {
            LibraryError::Conflict("An anime with this AniList or Kitsu ID already exists".into())
        })?;

        info!(anime_id = %created.id, "Anime added to catalog");
        Ok(CatalogAnime::from(created))
    }

    async fn get_anime(&self, id: &str) -> Result<CatalogAnime, LibraryError> {
        self.require_anime(id).await
    }

    async fn get_anime_by_anilist_id(&self, anilist_id: i32) -> Result<CatalogAnime, LibraryError> {
        self.store
            .get_anime_by_anilist_id(anilist_id)
            .await?
            .map(CatalogAnime::from)
            .ok_or_else(|| {
                LibraryError::NotFound(format!("Anime not found for AniList ID {anilist_id}"))
            })
    }

    async fn search_anime(&self, query: &str) -> Result<Vec<CatalogAnime>, LibraryError> {
        if query.trim().is_empty() {
            return Err(LibraryError::Validation("Search query required".into()));
        }
        Ok(self.store.search_anime(query, SEARCH_LIMIT).await?)
    }

    async fn popular_anime(&self) -> Result<Vec<CatalogAnime>, LibraryError> {
        Ok(self.store.popular_anime(POPULAR_LIMIT).await?)
    }

    async fn genres(&self) -> Result<Vec<String>, LibraryError> {
        Ok(self.store.unique_genres().await?)
    }

    async fn watchlist(&self, user_id: &str) -> Result<Vec<WatchlistEntry>, LibraryError> {
        let rows = self.store.get_user_watchlist(user_id).await?;
        Ok(rows
            .into_iter()
            .map(|(entry, anime)| WatchlistEntry::from_model(entry, anime.map(CatalogAnime::from)))
            .collect())
    }

    async fn add_to_watchlist(
        &self,
        entry: NewWatchlistEntry,
    ) -> Result<WatchlistEntry, LibraryError> {
        UserAnimePair {
            user_id: entry.user_id.clone(),
            anime_id: entry.anime_id.clone(),
        }
        .validate()
        .map_err(LibraryError::Validation)?;
        if entry.progress < 0 {
            return Err(LibraryError::Validation("Progress must not be negative".into()));
        }

        self.require_user(&entry.user_id).await?;
        let anime = self.require_anime(&entry.anime_id).await?;

        let created = self
            .store
            .add_to_watchlist(&entry)
            .await?
            .ok_or_else(|| LibraryError::Conflict("Anime is already in the watchlist".into()))?;

        Ok(WatchlistEntry::from_model(created, Some(anime)))
    }

    async fn update_watchlist(
        &self,
        id: &str,
        update: WatchlistUpdate,
    ) -> Result<WatchlistEntry, LibraryError> {
        if update.status.is_none() && update.progress.is_none() {
            return Err(LibraryError::Validation("Nothing to update".into()));
        }
        if update.progress.is_some_and(|p| p < 0) {
            return Err(LibraryError::Validation("Progress must not be negative".into()));
        }

        let updated = self
            .store
            .update_watchlist_entry(id, &update)
            .await?
            .ok_or_else(|| LibraryError::NotFound(format!("Watchlist entry not found: {id}")))?;

        let anime = self.store.get_anime(&updated.anime_id).await?;
        Ok(WatchlistEntry::from_model(
            updated,
            anime.map(CatalogAnime::from),
        ))
    }

    async fn remove_from_watchlist(&self, pair: UserAnimePair) -> Result<(), LibraryError> {
        pair.validate().map_err(LibraryError::Validation)?;
        let removed = self
            .store
            .remove_from_watchlist(&pair.user_id, &pair.anime_id)
            .await?;
        if removed == 0 {
            return Err(LibraryError::NotFound("Watchlist entry not found".into()));
        }
        Ok(())
    }

    async fn favorites(&self, user_id: &str) -> Result<Vec<FavoriteEntry>, LibraryError> {
        let rows = self.store.get_user_favorites(user_id).await?;
        Ok(rows
            .into_iter()
            .map(|(fav, anime)| FavoriteEntry::from_model(fav, anime.map(CatalogAnime::from)))
            .collect())
    }

    async fn add_favorite(&self, pair: UserAnimePair) -> Result<FavoriteEntry, LibraryError> {
        pair.validate().map_err(LibraryError::Validation)?;
        self.require_user(&pair.user_id).await?;
        let anime = self.require_anime(&pair.anime_id).await?;

        let created = self
            .store
            .add_favorite(&pair.user_id, &pair.anime_id)
            .await?
            .ok_or_else(|| LibraryError::Conflict("Anime is already a favorite".into()))?;

        Ok(FavoriteEntry::from_model(created, Some(anime)))
    }

    async fn remove_favorite(&self, pair: UserAnimePair) -> Result<(), LibraryError> {
        pair.validate().map_err(LibraryError::Validation)?;
        let removed = self
            .store
            .remove_favorite(&pair.user_id, &pair.anime_id)
            .await?;
        if removed == 0 {
            return Err(LibraryError::NotFound("Favorite not found".into()));
        }
        Ok(())
    }
}
