use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::anilist::AnilistClient;
use crate::clients::kitsu::KitsuClient;
use crate::config::Config;
use crate::services::{CatalogService, EpisodeService, LibraryService};
use crate::state::SharedState;

mod anime;
mod catalog;
mod episodes;
mod error;
mod favorites;
mod genres;
mod observability;
mod providers;
mod types;
mod users;
mod validation;
mod watchlist;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn anilist(&self) -> &Arc<AnilistClient> {
        &self.shared.anilist
    }

    #[must_use]
    pub fn kitsu(&self) -> &Arc<KitsuClient> {
        &self.shared.kitsu
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<CatalogService> {
        &self.shared.catalog
    }

    #[must_use]
    pub fn library(&self) -> &Arc<dyn LibraryService> {
        &self.shared.library_service
    }

    #[must_use]
    pub fn episodes(&self) -> &Arc<dyn EpisodeService> {
        &self.shared.episode_service
    }

    #[must_use]
    pub fn placeholder_user_id(&self) -> &str {
        &self.config().general.placeholder_user_id
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = api_routes().with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/anime", get(anime::get_anime))
        .route("/anilist", get(providers::get_anilist))
        .route("/kitsu", get(providers::get_kitsu))
        .route("/genres", get(genres::get_genres))
        .route(
            "/episodes",
            get(episodes::get_episodes).post(episodes::record_progress),
        )
        .route("/episodes/new", post(episodes::create_episode))
        .route("/users", post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route(
            "/catalog",
            get(catalog::list_catalog).post(catalog::create_catalog_anime),
        )
        .route("/catalog/genres", get(catalog::list_catalog_genres))
        .route(
            "/catalog/anilist/{anilist_id}",
            get(catalog::get_catalog_anime_by_anilist_id),
        )
        .route("/catalog/{id}", get(catalog::get_catalog_anime))
        .route(
            "/watchlist",
            get(watchlist::list_watchlist)
                .post(watchlist::add_to_watchlist)
                .delete(watchlist::remove_from_watchlist),
        )
        .route("/watchlist/{id}", put(watchlist::update_watchlist))
        .route(
            "/favorites",
            get(favorites::list_favorites)
                .post(favorites::add_favorite)
                .delete(favorites::remove_favorite),
        )
        .route("/metrics", get(observability::get_metrics))
}
