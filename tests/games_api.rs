//! Games catalog routes against the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};

use games_api::games::{Game, GameId, MemoryStore};

mod common;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn seeded_game(id: i64, name: &str, year: i32) -> Game {
    Game {
        id: GameId(id),
        name: name.to_string(),
        genre: Some("Platformer".to_string()),
        platform: Some("PC".to_string()),
        description: Some(format!("{name} description")),
        release_year: year,
        image_url: None,
    }
}

fn seeded_app() -> axum::Router {
    let store = MemoryStore::with_games([
        seeded_game(1, "Hollow Knight", 2017),
        seeded_game(2, "Celeste", 2018),
        seeded_game(3, "Cave Story", 2004),
    ]);
    common::app_with(common::test_config(), Arc::new(store))
}

fn celeste_payload() -> Value {
    json!({
        "nombre": "Celeste",
        "genero": "Platformer",
        "plataforma": "Switch",
        "descripcion": "Climb the mountain",
        "año_lanzamiento": 2018,
        "imagen_url": "https://images.example.com/celeste.png"
    })
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let app = common::app();

    let response = common::send(&app, get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Games API is running");
    assert!(body["endpoints"]["GET /api/games"].is_string());
    assert!(body["endpoints"]["GET /api/proxy-image?url=<url>"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = common::app();

    let response = common::send(&app, get("/api/players")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_json(response).await, json!({"error": "not found"}));
}

#[tokio::test]
async fn test_create_then_fetch() {
    let app = common::app();

    let response = common::send(&app, json_request("POST", "/api/games", celeste_payload())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::body_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["nombre"], "Celeste");
    assert_eq!(created["imagen_url"], "https://images.example.com/celeste.png");

    let response = common::send(&app, get("/api/games/1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await, created);
}

#[tokio::test]
async fn test_create_without_image_stores_null() {
    let app = common::app();
    let mut payload = celeste_payload();
    payload.as_object_mut().unwrap().remove("imagen_url");

    let response = common::send(&app, json_request("POST", "/api/games", payload)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(common::body_json(response).await["imagen_url"], Value::Null);
}

#[tokio::test]
async fn test_create_missing_fields_is_400() {
    let app = common::app();

    let response = common::send(
        &app,
        json_request("POST", "/api/games", json!({"nombre": "Celeste", "genero": ""})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("missing required fields"));
    assert!(error.contains("genero"));
    assert!(error.contains("año_lanzamiento"));
    assert!(!error.contains("nombre"));

    let listing = common::body_json(common::send(&app, get("/api/games")).await).await;
    assert_eq!(listing, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = common::app();
    let request = Request::post("/api/games")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"nombre\": "))
        .unwrap();

    let response = common::send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(common::body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = seeded_app();

    let response = common::send(&app, get("/api/games")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let years: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|game| game["año_lanzamiento"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![2018, 2017, 2004]);
}

#[tokio::test]
async fn test_missing_game_is_404() {
    let app = seeded_app();

    for uri in ["/api/games/99", "/api/games/abc"] {
        let response = common::send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            common::body_json(response).await,
            json!({"error": "game not found"})
        );
    }
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let app = seeded_app();

    let response = common::send(
        &app,
        json_request(
            "PUT",
            "/api/games/3",
            json!({"plataforma": "Switch", "imagen_url": "https://cdn.example.com/cs.jpg"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["id"], 3);
    assert_eq!(body["plataforma"], "Switch");
    assert_eq!(body["nombre"], "Cave Story");
    assert_eq!(body["año_lanzamiento"], 2004);
    assert_eq!(body["imagen_url"], "https://cdn.example.com/cs.jpg");

    // Explicit null clears the image.
    let response = common::send(
        &app,
        json_request("PUT", "/api/games/3", json!({"imagen_url": null})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await["imagen_url"], Value::Null);
}

#[tokio::test]
async fn test_update_rejections() {
    let app = seeded_app();

    let response = common::send(&app, json_request("PUT", "/api/games/1", json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        common::body_json(response).await,
        json!({"error": "no fields to update"})
    );

    let rename = json!({"nombre": "X"});
    let request = json_request("PUT", "/api/games/x", rename.clone());
    let response = common::send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = common::send(&app, json_request("PUT", "/api/games/42", rename)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_removes_game() {
    let app = seeded_app();
    let delete = || Request::delete("/api/games/2").body(Body::empty()).unwrap();

    let response = common::send(&app, delete()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        common::body_json(response).await,
        json!({"message": "game deleted"})
    );

    let response = common::send(&app, get("/api/games/2")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again is not an error.
    let response = common::send(&app, delete()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = common::app();
    let request = Request::get("/api/games")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = common::send(&app, request).await;

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = common::test_config();
    config.listener.max_body_bytes = 64;
    let app = common::app_with(config, Arc::new(MemoryStore::new()));
    let mut payload = celeste_payload();
    payload["descripcion"] = json!("x".repeat(1024));

    let body = payload.to_string();
    let request = Request::post("/api/games")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = common::send(&app, request).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
