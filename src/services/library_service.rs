//! Domain service for per-user state: accounts, the local anime catalog,
//! watchlists and favorites.

use crate::models::catalog::{CatalogAnime, NewCatalogAnime};
use crate::models::user::{
    FavoriteEntry, NewUser, NewWatchlistEntry, UserAnimePair, UserProfile, WatchlistEntry,
    WatchlistUpdate,
};
use thiserror::Error;

/// Errors specific to library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for LibraryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Domain service trait for user state.
#[async_trait::async_trait]
pub trait LibraryService: Send + Sync {
    /// Registers a user; email and username must both be unused.
    async fn create_user(&self, user: NewUser) -> Result<UserProfile, LibraryError>;

    /// A user with their watchlist and favorites expanded.
    async fn get_user(&self, id: &str) -> Result<UserProfile, LibraryError>;

    async fn create_anime(&self, anime: NewCatalogAnime) -> Result<CatalogAnime, LibraryError>;

    async fn get_anime(&self, id: &str) -> Result<CatalogAnime, LibraryError>;

    async fn get_anime_by_anilist_id(&self, anilist_id: i32) -> Result<CatalogAnime, LibraryError>;

    /// Title or synopsis search, best rated first, at most 20 results.
    async fn search_anime(&self, query: &str) -> Result<Vec<CatalogAnime>, LibraryError>;

    /// Best rated catalog entries, at most 12.
    async fn popular_anime(&self) -> Result<Vec<CatalogAnime>, LibraryError>;

    async fn genres(&self) -> Result<Vec<String>, LibraryError>;

    async fn watchlist(&self, user_id: &str) -> Result<Vec<WatchlistEntry>, LibraryError>;

    async fn add_to_watchlist(
        &self,
        entry: NewWatchlistEntry,
    ) -> Result<WatchlistEntry, LibraryError>;

    async fn update_watchlist(
        &self,
        id: &str,
        update: WatchlistUpdate,
    ) -> Result<WatchlistEntry, LibraryError>;

    async fn remove_from_watchlist(&self, pair: UserAnimePair) -> Result<(), LibraryError>;

    async fn favorites(&self, user_id: &str) -> Result<Vec<FavoriteEntry>, LibraryError>;

    async fn add_favorite(&self, pair: UserAnimePair) -> Result<FavoriteEntry, LibraryError>;

    async fn remove_favorite(&self, pair: UserAnimePair) -> Result<(), LibraryError>;
}
