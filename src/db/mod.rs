use crate::entities::{anime, episodes, favorites, users, watch_history, watchlist};
use crate::models::catalog::{CatalogAnime, NewCatalogAnime};
use crate::models::episode::NewEpisode;
use crate::models::user::{NewUser, NewWatchlistEntry, WatchlistUpdate};
use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to an in-memory database is its own database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);
        if !in_memory {
            opt.max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn anime_repo(&self) -> repositories::anime::AnimeRepository {
        repositories::anime::AnimeRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    fn favorite_repo(&self) -> repositories::favorite::FavoriteRepository {
        repositories::favorite::FavoriteRepository::new(self.conn.clone())
    }

    fn episode_repo(&self) -> repositories::episode::EpisodeRepository {
        repositories::episode::EpisodeRepository::new(self.conn.clone())
    }

    fn watch_history_repo(&self) -> repositories::watch_history::WatchHistoryRepository {
        repositories::watch_history::WatchHistoryRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, user: &NewUser) -> Result<Option<users::Model>> {
        self.user_repo().create(user).await
    }

    pub async fn create_user_with_id(
        &self,
        id: &str,
        user: &NewUser,
    ) -> Result<Option<users::Model>> {
        self.user_repo().create_with_id(id, user).await
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_username(username).await
    }

    // Local catalog

    pub async fn add_anime(&self, input: &NewCatalogAnime) -> Result<Option<anime::Model>> {
        self.anime_repo().create(input).await
    }

    pub async fn upsert_anime_by_anilist_id(&self, input: &NewCatalogAnime) -> Result<anime::Model> {
        self.anime_repo().upsert_by_anilist_id(input).await
    }

    pub async fn get_anime(&self, id: &str) -> Result<Option<anime::Model>> {
        self.anime_repo().get(id).await
    }

    pub async fn get_anime_by_anilist_id(&self, anilist_id: i32) -> Result<Option<anime::Model>> {
        self.anime_repo().get_by_anilist_id(anilist_id).await
    }

    pub async fn search_anime(&self, query: &str, limit: usize) -> Result<Vec<CatalogAnime>> {
        self.anime_repo().search(query, limit).await
    }

    pub async fn popular_anime(&self, limit: u64) -> Result<Vec<CatalogAnime>> {
        self.anime_repo().popular(limit).await
    }

    pub async fn unique_genres(&self) -> Result<Vec<String>> {
        self.anime_repo().genres().await
    }

    // Watchlist

    pub async fn add_to_watchlist(
        &self,
        entry: &NewWatchlistEntry,
    ) -> Result<Option<watchlist::Model>> {
        self.watchlist_repo().add(entry).await
    }

    pub async fn update_watchlist_entry(
        &self,
        id: &str,
        update: &WatchlistUpdate,
    ) -> Result<Option<watchlist::Model>> {
        self.watchlist_repo().update(id, update).await
    }

    pub async fn remove_from_watchlist(&self, user_id: &str, anime_id: &str) -> Result<u64> {
        self.watchlist_repo().remove(user_id, anime_id).await
    }

    pub async fn get_user_watchlist(
        &self,
        user_id: &str,
    ) -> Result<Vec<(watchlist::Model, Option<anime::Model>)>> {
        self.watchlist_repo().list_for_user(user_id).await
    }

    // Favorites

    pub async fn add_favorite(
        &self,
        user_id: &str,
        anime_id: &str,
    ) -> Result<Option<favorites::Model>> {
        self.favorite_repo().add(user_id, anime_id).await
    }

    pub async fn remove_favorite(&self, user_id: &str, anime_id: &str) -> Result<u64> {
        self.favorite_repo().remove(user_id, anime_id).await
    }

    pub async fn get_user_favorites(
        &self,
        user_id: &str,
    ) -> Result<Vec<(favorites::Model, Option<anime::Model>)>> {
        self.favorite_repo().list_for_user(user_id).await
    }

    // Episodes

    pub async fn create_episode(&self, input: &NewEpisode) -> Result<episodes::Model> {
        self.episode_repo().create(input).await
    }

    pub async fn get_episode(&self, id: &str) -> Result<Option<episodes::Model>> {
        self.episode_repo().get(id).await
    }

    pub async fn get_episode_with_anime(
        &self,
        id: &str,
    ) -> Result<Option<(episodes::Model, Option<anime::Model>)>> {
        self.episode_repo().get_with_anime(id).await
    }

    pub async fn list_episodes(
        &self,
        anime_id: &str,
    ) -> Result<Vec<(episodes::Model, Option<anime::Model>)>> {
        self.episode_repo().list_for_anime(anime_id).await
    }

    pub async fn list_season_episodes(
        &self,
        anime_id: &str,
        season: i32,
    ) -> Result<Vec<episodes::Model>> {
        self.episode_repo().list_for_season(anime_id, season).await
    }

    // Watch history

    pub async fn get_watch_history(
        &self,
        user_id: &str,
        episode_id: &str,
    ) -> Result<Option<watch_history::Model>> {
        self.watch_history_repo().get(user_id, episode_id).await
    }

    pub async fn upsert_watch_history(
        &self,
        user_id: &str,
        episode_id: &str,
        watch_time: i32,
        completed: bool,
        total_time: i32,
    ) -> Result<watch_history::Model> {
        self.watch_history_repo()
            .upsert(user_id, episode_id, watch_time, completed, total_time)
            .await
    }
}
