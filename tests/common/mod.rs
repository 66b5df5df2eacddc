#![allow(dead_code)]

use animedex::config::Config;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use tower::ServiceExt;

/// Stand-in for both upstream providers. A non-zero status makes that
/// provider answer every request with it. `kitsu_outages` makes the next
/// that many Kitsu requests answer 503 first.
#[derive(Default)]
pub struct Upstream {
    pub anilist_status: AtomicU16,
    pub kitsu_status: AtomicU16,
    pub kitsu_outages: AtomicUsize,
    pub anilist_calls: AtomicUsize,
    pub kitsu_calls: AtomicUsize,
}

impl Upstream {
    pub fn with_status(anilist: u16, kitsu: u16) -> Arc<Self> {
        let upstream = Self::default();
        upstream.anilist_status.store(anilist, Ordering::SeqCst);
        upstream.kitsu_status.store(kitsu, Ordering::SeqCst);
        Arc::new(upstream)
    }

    pub fn fail_kitsu_times(&self, times: usize) {
        self.kitsu_outages.store(times, Ordering::SeqCst);
    }

    pub fn anilist_calls(&self) -> usize {
        self.anilist_calls.load(Ordering::SeqCst)
    }

    pub fn kitsu_calls(&self) -> usize {
        self.kitsu_calls.load(Ordering::SeqCst)
    }
}

pub fn attack_on_titan() -> Value {
    json!({
        "id": 16498,
        "title": {
            "english": "Attack on Titan",
            "romaji": "Shingeki no Kyojin",
            "native": "進撃の巨人"
        },
        "coverImage": { "large": "https://s4.anilist.co/file/anilistcdn/media/anime/cover/large/bx16498.jpg" },
        "bannerImage": null,
        "description": "Several hundred years ago, humans were nearly exterminated by titans.<br>",
        "episodes": 25,
        "status": "FINISHED",
        "genres": ["Action", "Drama"],
        "averageScore": 84,
        "studios": { "nodes": [{ "name": "Wit Studio" }] },
        "season": "SPRING",
        "seasonYear": 2013
    })
}

pub fn cowboy_bebop() -> Value {
    json!({
        "id": "1",
        "type": "anime",
        "attributes": {
            "canonicalTitle": "Cowboy Bebop",
            "titles": { "en": "Cowboy Bebop", "en_jp": "Cowboy Bebop", "ja_jp": "カウボーイビバップ" },
            "synopsis": "In the year 2071...",
            "posterImage": { "large": "https://media.kitsu.io/anime/poster_images/1/large.jpg" },
            "episodeCount": 26,
            "status": "finished",
            "averageRating": "8.0",
            "startDate": "1998-04-03"
        }
    })
}

fn failure(status: u16) -> Option<Response> {
    (status != 0).then(|| {
        StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response()
    })
}

fn kitsu_failure(up: &Upstream) -> Option<Response> {
    let outage = up
        .kitsu_outages
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if outage {
        return Some(StatusCode::SERVICE_UNAVAILABLE.into_response());
    }
    failure(up.kitsu_status.load(Ordering::SeqCst))
}

async fn anilist_graphql(State(up): State<Arc<Upstream>>, Json(body): Json<Value>) -> Response {
    up.anilist_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = failure(up.anilist_status.load(Ordering::SeqCst)) {
        return resp;
    }

    let query = body["query"].as_str().unwrap_or_default();

    let payload = if query.contains("GenreCollection") {
        json!({ "data": { "GenreCollection": ["Action", "Drama", "Romance"] } })
    } else if query.contains("Media(id") {
        if body["variables"]["id"] == json!(16498) {
            json!({ "data": { "Media": attack_on_titan() } })
        } else {
            json!({ "data": { "Media": null }, "errors": [{ "message": "Not Found.", "status": 404 }] })
        }
    } else if query.contains("genre_in") {
        json!({ "data": { "Page": {
            "pageInfo": { "hasNextPage": true },
            "media": [attack_on_titan()]
        } } })
    } else {
        json!({ "data": { "Page": { "media": [attack_on_titan()] } } })
    };

    Json(payload).into_response()
}

async fn kitsu_list(State(up): State<Arc<Upstream>>) -> Response {
    up.kitsu_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = kitsu_failure(&up) {
        return resp;
    }
    Json(json!({ "data": [cowboy_bebop()] })).into_response()
}

async fn kitsu_detail(
    State(up): State<Arc<Upstream>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    up.kitsu_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = kitsu_failure(&up) {
        return resp;
    }
    if id != "1" {
        return StatusCode::NOT_FOUND.into_response();
    }

    if params.get("include").map(String::as_str) == Some("genres") {
        Json(json!({
            "data": cowboy_bebop(),
            "included": [
                { "id": "1", "type": "genres", "attributes": { "name": "Action" } },
                { "id": "2", "type": "genres", "attributes": { "name": "Space" } }
            ]
        }))
        .into_response()
    } else {
        Json(json!({ "data": cowboy_bebop() })).into_response()
    }
}

/// Serves the fake providers on an ephemeral port and returns its address.
pub async fn spawn_upstream(upstream: Arc<Upstream>) -> String {
    let app = Router::new()
        .route("/graphql", post(anilist_graphql))
        .route("/kitsu/anime", get(kitsu_list))
        .route("/kitsu/anime/{id}", get(kitsu_detail))
        .with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

pub fn test_config(upstream_url: &str) -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.observability.metrics_enabled = false;
    config.providers.anilist_url = format!("{upstream_url}/graphql");
    config.providers.kitsu_url = format!("{upstream_url}/kitsu");
    config.providers.kitsu_max_attempts = 1;
    config.providers.kitsu_retry_delay_ms = 0;
    config.providers.request_timeout_seconds = 5;
    config
}

pub async fn spawn_app_with(upstream: Arc<Upstream>) -> Router {
    spawn_app_with_config(upstream, |_| {}).await
}

/// Like [`spawn_app_with`] with the default Kitsu attempt budget of two and
/// a short delay between attempts.
pub async fn spawn_app_with_retry(upstream: Arc<Upstream>) -> Router {
    spawn_app_with_config(upstream, |config| {
        config.providers.kitsu_max_attempts = 2;
        config.providers.kitsu_retry_delay_ms = 10;
    })
    .await
}

pub async fn spawn_app_with_config(
    upstream: Arc<Upstream>,
    customize: impl FnOnce(&mut Config),
) -> Router {
    let url = spawn_upstream(upstream).await;
    let mut config = test_config(&url);
    customize(&mut config);
    let state = animedex::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    animedex::api::router(state)
}

pub async fn spawn_app() -> (Router, Arc<Upstream>) {
    let upstream = Arc::new(Upstream::default());
    (spawn_app_with(upstream.clone()).await, upstream)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    (status, json)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}
