use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::clients::anilist::AnilistClient;
use crate::clients::kitsu::KitsuClient;
use crate::clients::{ResponseCache, build_http_client};
use crate::config::{Config, ProvidersConfig};
use crate::db::Store;
use crate::models::user::NewUser;
use crate::services::{
    CatalogService, EpisodeService, LibraryService, SeaOrmEpisodeService, SeaOrmLibraryService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub anilist: Arc<AnilistClient>,

    pub kitsu: Arc<KitsuClient>,

    pub catalog: Arc<CatalogService>,

    pub library_service: Arc<dyn LibraryService>,

    pub episode_service: Arc<dyn EpisodeService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        ensure_placeholder_user(&store, &config.general.placeholder_user_id).await?;

        let Providers {
            anilist,
            kitsu,
            catalog,
        } = build_providers(&config.providers)?;

        let library_service: Arc<dyn LibraryService> =
            Arc::new(SeaOrmLibraryService::new(store.clone()));
        let episode_service: Arc<dyn EpisodeService> =
            Arc::new(SeaOrmEpisodeService::new(store.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            anilist,
            kitsu,
            catalog,
            library_service,
            episode_service,
        })
    }
}

/// The two upstream adapters and the fallback service over them.
pub struct Providers {
    pub anilist: Arc<AnilistClient>,
    pub kitsu: Arc<KitsuClient>,
    pub catalog: Arc<CatalogService>,
}

/// Builds both adapters on one pooled HTTP client, each with its own cache.
pub fn build_providers(config: &ProvidersConfig) -> anyhow::Result<Providers> {
    let http_client = build_http_client(config.request_timeout_seconds)?;
    let cache_ttl = Duration::from_secs(config.cache_ttl_seconds);

    let anilist = Arc::new(AnilistClient::with_shared_client(
        http_client.clone(),
        config.anilist_url.clone(),
        ResponseCache::new(cache_ttl),
    ));
    let kitsu = Arc::new(
        KitsuClient::with_shared_client(
            http_client,
            config.kitsu_url.clone(),
            ResponseCache::new(cache_ttl),
        )
        .with_retry(
            config.kitsu_max_attempts,
            Duration::from_millis(config.kitsu_retry_delay_ms),
        ),
    );

    let catalog = Arc::new(CatalogService::new(
        anilist.clone(),
        kitsu.clone(),
        config.fallback_by_default,
    ));

    info!(
        anilist = %config.anilist_url,
        kitsu = %config.kitsu_url,
        cache_ttl_seconds = config.cache_ttl_seconds,
        "Metadata providers configured"
    );

    Ok(Providers {
        anilist,
        kitsu,
        catalog,
    })
}

/// Watch progress is attributed to the placeholder user until accounts are
/// authenticated, so the row has to exist for its foreign keys.
async fn ensure_placeholder_user(store: &Store, id: &str) -> anyhow::Result<()> {
    if store.get_user(id).await?.is_some() {
        debug!(user_id = %id, "Placeholder user already present");
        return Ok(());
    }

    let user = NewUser {
        email: format!("{id}@animedex.local"),
        username: id.to_string(),
        avatar: None,
    };

    if store.create_user_with_id(id, &user).await?.is_none() {
        anyhow::bail!(
            "Cannot create placeholder user {id}: username or email already belongs to another user"
        );
    }

    info!(user_id = %id, "Created placeholder user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_user_created_once() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        ensure_placeholder_user(&store, "demo-user").await.unwrap();
        ensure_placeholder_user(&store, "demo-user").await.unwrap();

        let user = store.get_user("demo-user").await.unwrap().unwrap();
        assert_eq!(user.email, "demo-user@animedex.local");
    }

    #[tokio::test]
    async fn test_placeholder_user_blocked_by_taken_username() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let squatter = NewUser {
            email: "someone@example.com".to_string(),
            username: "demo-user".to_string(),
            avatar: None,
        };
        store.create_user(&squatter).await.unwrap().unwrap();

        let err = ensure_placeholder_user(&store, "demo-user").await.unwrap_err();

        assert!(err.to_string().contains("already belongs to another user"));
        assert!(store.get_user("demo-user").await.unwrap().is_none());
    }
}
