//! Scene, game and character image endpoints, and the generated-image cache.

use axum::http::StatusCode;
use base64::prelude::*;
use serde_json::json;

use tagalong::genai::Part;
use tagalong::server::ASSET_CACHE_HIT_HEADER;

use super::test_utils::{
    file_count, get, post_json, test_app, MockModel, TestAppBuilder, CHEF, TEST_JPEG, TEST_PNG,
};

fn game_body(round: u32, choices: &[&str]) -> serde_json::Value {
    json!({
        "characterId": CHEF,
        "sceneId": "7",
        "round": round,
        "previousChoices": choices,
        "currentPrompt": "base"
    })
}

// =============================================================================
// Scene Images
// =============================================================================

#[tokio::test]
async fn test_scene_image_generated_once() {
    let app = test_app();
    let uri = format!("/api/scene-image?characterId={}&sceneId=1", CHEF);

    let first = get(&app, &uri).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("content-type"), Some("image/png"));
    assert_eq!(first.header(ASSET_CACHE_HIT_HEADER), Some("false"));
    assert_eq!(first.body.as_ref(), TEST_PNG);

    let second = get(&app, &uri).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.header(ASSET_CACHE_HIT_HEADER), Some("true"));
    assert_eq!(second.body, first.body);
    assert_eq!(second.header("etag"), first.header("etag"));

    assert_eq!(app.model.image_calls(), 1);
    assert_eq!(file_count(&app.data_dir.path().join("scene-images")), 1);
}

#[tokio::test]
async fn test_concurrent_scene_image_misses() {
    let app = test_app();
    let uri = format!("/api/scene-image?characterId={}&sceneId=3", CHEF);

    let (a, b) = tokio::join!(get(&app, &uri), get(&app, &uri));
    assert_eq!(a.status, StatusCode::OK);
    assert_eq!(b.status, StatusCode::OK);
    assert_eq!(a.body, b.body);

    let calls = app.model.image_calls();
    assert!((1..=2).contains(&calls));
    assert_eq!(file_count(&app.data_dir.path().join("scene-images")), 1);

    let after = get(&app, &uri).await;
    assert_eq!(after.header(ASSET_CACHE_HIT_HEADER), Some("true"));
    assert_eq!(app.model.image_calls(), calls);
}

#[tokio::test]
async fn test_scene_image_headers() {
    let app = test_app();
    let response = get(&app, &format!("/api/scene-image?characterId={}&sceneId=4", CHEF)).await;

    assert_eq!(
        response.header("cache-control"),
        Some("public, max-age=86400, immutable")
    );
    let etag = response.header("etag").unwrap();
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert_eq!(etag.len(), 64 + 2);
}

#[tokio::test]
async fn test_scene_image_uses_reference_and_caption() {
    let app = test_app();
    get(&app, &format!("/api/scene-image?characterId={}&sceneId=13", CHEF)).await;

    let parts = app.model.last_image_parts();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], Part::png(TEST_PNG));
    match &parts[1] {
        Part::Text(prompt) => assert!(prompt.contains("Walk a Venetian food tour")),
        other => panic!("expected a text part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scene_image_survives_restart() {
    let app = test_app();
    let uri = format!("/api/scene-image?characterId={}&sceneId=2", CHEF);
    let first = get(&app, &uri).await;
    assert_eq!(first.status, StatusCode::OK);

    let restarted = TestAppBuilder::new().data_dir(app.data_dir).build();
    let second = get(&restarted, &uri).await;

    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.header(ASSET_CACHE_HIT_HEADER), Some("true"));
    assert_eq!(second.body, first.body);
    assert_eq!(restarted.model.image_calls(), 0);
}

#[tokio::test]
async fn test_scene_image_unknown_character() {
    let app = test_app();
    let response = get(&app, "/api/scene-image?characterId=nobody&sceneId=1").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.model.image_calls(), 0);
}

#[tokio::test]
async fn test_scene_image_rejects_traversal() {
    let app = test_app();
    let response = get(&app, "/api/scene-image?characterId=..&sceneId=1").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "invalid_key");
}

#[tokio::test]
async fn test_scene_image_missing_reference() {
    let app = TestAppBuilder::new().without_reference_image().build();
    let response = get(&app, &format!("/api/scene-image?characterId={}&sceneId=1", CHEF)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "reference_image_missing");
    assert_eq!(app.model.image_calls(), 0);
}

#[tokio::test]
async fn test_scene_image_model_failure_not_cached() {
    let app = TestAppBuilder::new()
        .model(MockModel::new().failing_image())
        .build();
    let uri = format!("/api/scene-image?characterId={}&sceneId=1", CHEF);

    let response = get(&app, &uri).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);

    get(&app, &uri).await;
    assert_eq!(app.model.image_calls(), 2);
    assert_eq!(file_count(&app.data_dir.path().join("scene-images")), 0);
}

#[tokio::test]
async fn test_scene_image_disabled() {
    let app = TestAppBuilder::new().generation_disabled().build();
    let response = get(&app, &format!("/api/scene-image?characterId={}&sceneId=1", CHEF)).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json()["error"], "generation_disabled");
    assert_eq!(app.model.image_calls(), 0);
}

// =============================================================================
// Game Images
// =============================================================================

#[tokio::test]
async fn test_game_image_disabled_writes_nothing() {
    let app = TestAppBuilder::new().generation_disabled().build();

    for _ in 0..2 {
        let response = post_json(&app, "/api/game-image", game_body(0, &[])).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    assert_eq!(app.model.image_calls(), 0);
    assert!(!app.data_dir.path().join("game-images").exists());
}

#[tokio::test]
async fn test_game_image_cached_per_choices() {
    let app = test_app();

    let first = post_json(&app, "/api/game-image", game_body(1, &["Salmon fillet"])).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header(ASSET_CACHE_HIT_HEADER), Some("false"));

    let repeat = post_json(&app, "/api/game-image", game_body(1, &["Salmon fillet"])).await;
    assert_eq!(repeat.header(ASSET_CACHE_HIT_HEADER), Some("true"));
    assert_eq!(repeat.body, first.body);

    let other = post_json(&app, "/api/game-image", game_body(1, &["Rack of lamb"])).await;
    assert_eq!(other.header(ASSET_CACHE_HIT_HEADER), Some("false"));

    assert_eq!(app.model.image_calls(), 2);
    assert_eq!(file_count(&app.data_dir.path().join("game-images")), 2);
}

#[tokio::test]
async fn test_game_image_first_round_uses_reference() {
    let app = test_app();
    let response = post_json(&app, "/api/game-image", game_body(0, &[])).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.model.last_image_parts()[0], Part::png(TEST_PNG));
}

#[tokio::test]
async fn test_game_image_later_round_uses_base_image() {
    let app = test_app();
    let mut body = game_body(2, &["Salmon fillet", "Pan-seared"]);
    body["baseImageData"] = json!(format!(
        "data:image/jpeg;base64,{}",
        BASE64_STANDARD.encode(TEST_JPEG)
    ));

    let response = post_json(&app, "/api/game-image", body).await;
    assert_eq!(response.status, StatusCode::OK);

    match &app.model.last_image_parts()[0] {
        Part::InlineData { mime_type, data } => {
            assert_eq!(mime_type, "image/jpeg");
            assert_eq!(data.as_ref(), TEST_JPEG);
        }
        other => panic!("expected inline data, got {:?}", other),
    }
}

#[tokio::test]
async fn test_game_image_later_round_requires_base_image() {
    let app = test_app();

    let missing = post_json(&app, "/api/game-image", game_body(3, &["a", "b", "c"])).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["error"], "invalid_base_image");

    let mut garbage = game_body(3, &["a", "b", "c"]);
    garbage["baseImageData"] = json!("!!not base64!!");
    let invalid = post_json(&app, "/api/game-image", garbage).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.model.image_calls(), 0);
}

#[tokio::test]
async fn test_game_image_malformed_body() {
    let app = test_app();
    let response = post_json(&app, "/api/game-image", json!({"round": 1})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "invalid_request");
}

// =============================================================================
// Character Images
// =============================================================================

#[tokio::test]
async fn test_character_image_is_not_cached() {
    let app = test_app();
    let uri = "/api/character-image?prompt=smiling%20baker";

    let first = get(&app, uri).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("content-type"), Some("image/png"));
    assert_eq!(first.body.as_ref(), TEST_PNG);

    get(&app, uri).await;
    assert_eq!(app.model.image_calls(), 2);

    match &app.model.last_image_parts()[0] {
        Part::Text(prompt) => assert!(prompt.contains("smiling baker")),
        other => panic!("expected a text part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_character_image_requires_prompt() {
    let app = test_app();
    let response = get(&app, "/api/character-image").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "prompt required");
}
