use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use scorecard_back::{
    auth::{Identity, StaticTokenVerifier},
    dao::game_store::memory::InMemoryGameStore,
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const ALICE: &str = "token-alice";
const BOB: &str = "token-bob";

fn app() -> (Router, InMemoryGameStore) {
    let store = InMemoryGameStore::new();
    let verifier = StaticTokenVerifier::new([
        (
            ALICE.to_string(),
            Identity {
                uid: "alice".into(),
                email: "alice@example.com".into(),
            },
        ),
        (
            BOB.to_string(),
            Identity {
                uid: "bob".into(),
                email: "bob@example.com".into(),
            },
        ),
    ]);
    let state = AppState::with_game_store(Arc::new(store.clone()), Arc::new(verifier));
    (routes::router(state), store)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_game(app: &Router, token: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/games",
        Some(token),
        Some(json!({
            "numberHoles": 3,
            "players": [{ "name": "A" }, { "name": "B", "uid": "u-b" }],
            "title": "Sunday round"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_a_valid_token_are_unauthorized() {
    let (app, _store) = app();

    let (status, body) = send(&app, Method::GET, "/games", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");

    let (status, _) = send(&app, Method::GET, "/games", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn healthcheck_needs_no_token() {
    let (app, _store) = app();

    let (status, body) = send(&app, Method::GET, "/healthcheck", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn bare_token_without_scheme_is_accepted() {
    let (app, _store) = app();
    let request = Request::builder()
        .uri("/games")
        .header(header::AUTHORIZATION, ALICE)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn created_game_is_fetched_with_names_and_totals() {
    let (app, store) = app();
    let id = create_game(&app, ALICE).await;
    assert_eq!(store.len(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/games/{id}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["userId"], "alice");
    assert_eq!(body["title"], "Sunday round");
    assert!(body["date"].as_str().is_some());
    assert_eq!(body["players"][1]["name"], "B");
    assert_eq!(body["players"][1]["uid"], "u-b");
    assert_eq!(body["players"][1]["scorecardIndex"], 1);
    assert_eq!(body["players"][1]["totalScore"], 0);
    assert_eq!(body["holes"]["3"][0]["name"], "A");
    assert!(body["holes"]["3"][0]["score"].is_null());
}

#[tokio::test]
async fn patch_replaces_one_hole_and_updates_totals() {
    let (app, _store) = app();
    let id = create_game(&app, ALICE).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/games/{id}/holes/2"),
        Some(ALICE),
        Some(json!({ "scores": [
            { "scorecardIndex": 0, "score": 4 },
            { "scorecardIndex": 1, "score": 5, "name": "ignored" }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("{id} - 2 updated successfully"));

    let (_, body) = send(&app, Method::GET, &format!("/games/{id}"), Some(ALICE), None).await;
    assert_eq!(body["players"][0]["totalScore"], 4);
    assert_eq!(body["players"][1]["totalScore"], 5);
    assert_eq!(body["holes"]["2"][1]["name"], "B");
    assert!(body["holes"]["1"][0]["score"].is_null());
}

#[tokio::test]
async fn list_returns_summaries_only() {
    let (app, _store) = app();
    let id = create_game(&app, ALICE).await;
    create_game(&app, BOB).await;

    let (status, body) = send(&app, Method::GET, "/games", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);

    let games = body.as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["id"], id);
    assert_eq!(games[0]["title"], "Sunday round");
    assert!(games[0].get("date").is_some());
    assert!(games[0].get("players").is_none());
    assert!(games[0].get("holes").is_none());
}

#[tokio::test]
async fn delete_then_fetch_is_not_found() {
    let (app, store) = app();
    let id = create_game(&app, ALICE).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/games/{id}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    assert!(store.is_empty());

    let (status, body) = send(&app, Method::GET, &format!("/games/{id}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found.");

    let (status, _) = send(&app, Method::DELETE, &format!("/games/{id}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_users_cannot_touch_a_game() {
    let (app, store) = app();
    let id = create_game(&app, ALICE).await;

    let (status, _) = send(&app, Method::GET, &format!("/games/{id}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/games/{id}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn non_uuid_game_ids_are_not_found() {
    let (app, store) = app();
    create_game(&app, ALICE).await;

    let (status, body) = send(&app, Method::GET, "/games/abc123XYZ", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found.");

    let (status, _) = send(&app, Method::DELETE, "/games/abc123XYZ", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/games/abc123XYZ/holes/1",
        Some(ALICE),
        Some(json!({ "scores": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn unknown_hole_is_not_found() {
    let (app, _store) = app();
    let id = create_game(&app, ALICE).await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/games/{id}/holes/4"),
        Some(ALICE),
        Some(json!({ "scores": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let (app, store) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/games",
        Some(ALICE),
        Some(json!({ "numberHoles": 0, "players": [{ "name": "A" }], "title": "t" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You have provided an invalid request payload.");

    let (status, _) = send(
        &app,
        Method::POST,
        "/games",
        Some(ALICE),
        Some(json!({ "numberHoles": "nine", "players": [], "title": "t" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = create_game(&app, ALICE).await;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/games/{id}/holes/first"),
        Some(ALICE),
        Some(json!({ "scores": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.len(), 1);
}
