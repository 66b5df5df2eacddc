mod common;

use axum::{Router, http::StatusCode};
use common::{delete, get_json, send_json, spawn_app};
use serde_json::{Value, json};

async fn create_user(app: &Router, username: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/users",
        json!({ "email": format!("{username}@example.com"), "username": username }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_anime(app: &Router, anilist_id: i32, title: &str, rating: f64) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/catalog",
        json!({
            "anilistId": anilist_id,
            "title": { "english": title, "romaji": title },
            "coverImage": format!("https://example.com/{anilist_id}.jpg"),
            "synopsis": format!("{title} synopsis"),
            "episodes": 12,
            "genres": ["Action", "Drama"],
            "rating": rating
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_episode(app: &Router, anime_id: &str, season: i32, number: i32) -> Value {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/episodes/new",
        json!({
            "animeId": anime_id,
            "season": season,
            "number": number,
            "title": format!("S{season}E{number}"),
            "duration": 1440
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_user_lifecycle() {
    let (app, _) = spawn_app().await;

    let id = create_user(&app, "spike").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/users",
        json!({ "email": "spike@example.com", "username": "someone-else" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, body) = send_json(&app, "POST", "/api/users", json!({ "username": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = get_json(&app, &format!("/api/users/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "spike");
    assert_eq!(body["watchlist"], json!([]));
    assert_eq!(body["favorites"], json!([]));

    let (status, _) = get_json(&app, "/api/users/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_placeholder_user_exists_at_startup() {
    let (app, _) = spawn_app().await;

    let (status, body) = get_json(&app, "/api/users/demo-user").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "demo-user@animedex.local");
}

#[tokio::test]
async fn test_catalog_search_popular_and_genres() {
    let (app, _) = spawn_app().await;

    let aot = create_anime(&app, 16498, "Attack on Titan", 9.0).await;
    create_anime(&app, 21, "One Piece", 9.1).await;
    create_anime(&app, 30, "Death Note", 8.9).await;

    let (status, body) = get_json(&app, "/api/catalog").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"]["english"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["One Piece", "Attack on Titan", "Death Note"]);

    let (status, body) = get_json(&app, "/api/catalog?q=titan").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], aot.as_str());

    let (status, body) = get_json(&app, "/api/catalog/anilist/21").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"]["romaji"], "One Piece");

    let (status, _) = get_json(&app, "/api/catalog/anilist/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&app, &format!("/api/catalog/{aot}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genres"], json!(["Action", "Drama"]));

    let (status, _) = get_json(&app, "/api/catalog/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(&app, "/api/catalog/genres").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Action", "Drama"]));
}

#[tokio::test]
async fn test_duplicate_catalog_anime_conflicts() {
    let (app, _) = spawn_app().await;
    create_anime(&app, 30, "Death Note", 9.0).await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/catalog",
        json!({
            "anilistId": 30,
            "title": { "english": "Death Note" },
            "coverImage": "https://example.com/30.jpg"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_watchlist_flow() {
    let (app, _) = spawn_app().await;
    let user = create_user(&app, "faye").await;
    let anime = create_anime(&app, 1, "Cowboy Bebop", 8.8).await;
    let pair = json!({ "userId": user, "animeId": anime });

    let (status, entry) = send_json(&app, "POST", "/api/watchlist", pair.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["status"], "planned");
    assert_eq!(entry["progress"], 0);

    let (status, body) = send_json(&app, "POST", "/api/watchlist", pair).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let entry_id = entry["id"].as_str().unwrap();
    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/watchlist/{entry_id}"),
        json!({ "status": "watching", "progress": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "watching");
    assert_eq!(updated["progress"], 5);

    let (status, list) = get_json(&app, &format!("/api/watchlist?userId={user}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["anime"]["title"]["english"], "Cowboy Bebop");

    let (status, body) = delete(
        &app,
        &format!("/api/watchlist?userId={user}&animeId={anime}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = delete(
        &app,
        &format!("/api/watchlist?userId={user}&animeId={anime}"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(&app, "/api/watchlist").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID required");
}

#[tokio::test]
async fn test_favorites_flow() {
    let (app, _) = spawn_app().await;
    let user = create_user(&app, "jet").await;
    let anime = create_anime(&app, 30, "Death Note", 9.0).await;
    let pair = json!({ "userId": user, "animeId": anime });

    let (status, _) = send_json(&app, "POST", "/api/favorites", pair.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(&app, "POST", "/api/favorites", pair).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/favorites",
        json!({ "userId": user, "animeId": "missing" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    let (_, list) = get_json(&app, &format!("/api/favorites?userId={user}")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["anime"]["id"], anime.as_str());

    let (status, _) = delete(&app, &format!("/api/favorites?userId={user}&animeId={anime}")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, profile) = get_json(&app, &format!("/api/users/{user}")).await;
    assert_eq!(profile["favorites"], json!([]));
}

#[tokio::test]
async fn test_episode_listing_groups_by_season() {
    let (app, _) = spawn_app().await;
    let anime = create_anime(&app, 16498, "Attack on Titan", 9.0).await;

    create_episode(&app, &anime, 2, 1).await;
    create_episode(&app, &anime, 1, 2).await;
    create_episode(&app, &anime, 1, 1).await;

    let (status, body) = get_json(&app, &format!("/api/episodes?type=list&animeId={anime}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalEpisodes"], 3);
    assert_eq!(body["episodesBySeason"]["1"][0]["number"], 1);
    assert_eq!(body["episodesBySeason"]["1"][1]["number"], 2);
    assert_eq!(body["episodesBySeason"]["2"][0]["title"], "S2E1");
    assert_eq!(
        body["episodesBySeason"]["1"][0]["anime"]["title"]["english"],
        "Attack on Titan"
    );

    let (status, body) = get_json(
        &app,
        &format!("/api/episodes?type=season&animeId={anime}&season=1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["season"], 1);
    assert_eq!(body["totalEpisodes"], 2);

    let uri = format!("/api/episodes?type=season&animeId={anime}");
    let (status, body) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Anime ID and season required");

    let (status, body) = get_json(&app, "/api/episodes?type=list").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Anime ID required");

    let (status, body) = get_json(&app, "/api/episodes?type=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid type parameter");
}

#[tokio::test]
async fn test_watch_progress_upserts_one_row() {
    let (app, _) = spawn_app().await;
    let anime = create_anime(&app, 21, "One Piece", 9.1).await;
    let episode = create_episode(&app, &anime, 1, 1).await;
    let episode_id = episode["id"].as_str().unwrap();
    let uri = format!("/api/episodes?episodeId={episode_id}");
    let detail_uri = format!("/api/episodes?type=detail&episodeId={episode_id}");

    let (status, detail) = get_json(&app, &detail_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["watchHistory"].is_null());

    let (status, first) = send_json(
        &app,
        "POST",
        &uri,
        json!({ "userId": "demo-user", "watchTime": 300 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert_eq!(first["success"], true);
    assert_eq!(first["watchHistory"]["watchTime"], 300);
    assert_eq!(first["watchHistory"]["totalTime"], 1440);
    assert_eq!(first["watchHistory"]["completed"], false);

    let (status, second) = send_json(
        &app,
        "POST",
        &uri,
        json!({ "userId": "demo-user", "watchTime": 1440, "completed": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["watchHistory"]["id"], first["watchHistory"]["id"]);
    assert_eq!(second["watchHistory"]["watchTime"], 1440);
    assert_eq!(second["watchHistory"]["completed"], true);

    let (_, detail) = get_json(&app, &detail_uri).await;
    assert_eq!(
        detail["watchHistory"],
        json!({ "watchTime": 1440, "totalTime": 1440, "completed": true })
    );
    assert_eq!(detail["anime"]["title"]["english"], "One Piece");
}

#[tokio::test]
async fn test_watch_progress_rejections() {
    let (app, _) = spawn_app().await;

    let progress = json!({ "userId": "demo-user", "watchTime": 1 });

    let (status, body) = send_json(&app, "POST", "/api/episodes", progress.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Episode ID required");

    let (status, body) =
        send_json(&app, "POST", "/api/episodes?episodeId=e1", json!({ "watchTime": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID required");

    let (status, body) = send_json(&app, "POST", "/api/episodes?episodeId=missing", progress).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Episode not found");

    let (status, body) = get_json(&app, "/api/episodes?type=detail&episodeId=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Episode not found");
}
