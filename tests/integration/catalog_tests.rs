//! Character and scene catalog endpoints.

use axum::http::StatusCode;
use serde_json::json;

use super::test_utils::{get, post_json, test_app, TestAppBuilder, CHEF};

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let response = get(&app, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_list_characters() {
    let app = test_app();
    let response = get(&app, "/api/characters").await;

    assert_eq!(response.status, StatusCode::OK);
    let characters = response.json();
    let characters = characters.as_array().unwrap();
    assert_eq!(characters.len(), 10);
    assert!(characters.iter().any(|c| c["id"] == CHEF));
}

#[tokio::test]
async fn test_characters_carry_portrait_url() {
    let app = test_app();

    for uri in ["/api/characters", "/api/characters?q=chef"] {
        let response = get(&app, uri).await;
        let characters = response.json();
        let chef = characters
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["id"] == CHEF)
            .unwrap()
            .clone();

        assert_eq!(chef["portraitUrl"], "/characters/chef-nomi-delgado.png");
        assert_eq!(chef["portraitUrl"], chef["imageUrl"]);
    }
}

#[tokio::test]
async fn test_search_characters() {
    let app = test_app();
    let response = get(&app, "/api/characters?q=COMEDIAN").await;

    assert_eq!(response.status, StatusCode::OK);
    let results = response.json();
    let results = results.as_array().unwrap();
    assert!(results.iter().any(|c| c["id"] == "riff-kwan"));
    assert!(results.len() < 10);
}

#[tokio::test]
async fn test_search_without_matches_is_empty() {
    let app = test_app();
    let response = get(&app, "/api/characters?q=zzqqxx").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn test_blank_search_returns_all() {
    let app = test_app();
    let response = get(&app, "/api/characters?q=%20").await;
    assert_eq!(response.json().as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_scenes_require_character_id() {
    let app = test_app();
    let response = get(&app, "/api/scenes").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_scenes_unknown_character() {
    let app = test_app();
    let response = get(&app, "/api/scenes?characterId=nobody").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "character_not_found");
}

#[tokio::test]
async fn test_predefined_scenes() {
    let app = test_app();
    let response = get(&app, &format!("/api/scenes?characterId={}", CHEF)).await;

    assert_eq!(response.status, StatusCode::OK);
    let scenes = response.json();
    let scenes = scenes.as_array().unwrap();
    assert_eq!(scenes.len(), 13);

    let quiz = scenes.iter().find(|s| s["id"] == "5").unwrap();
    assert_eq!(quiz["type"], "Learn");
    assert_eq!(quiz["experience"], "quiz");

    let game = scenes.iter().find(|s| s["id"] == "7").unwrap();
    assert_eq!(game["experience"], "game-progression");
}

#[tokio::test]
async fn test_get_single_scene() {
    let app = test_app();
    let response = get(&app, &format!("/api/scenes/{}/13", CHEF)).await;

    assert_eq!(response.status, StatusCode::OK);
    let scene = response.json();
    assert_eq!(scene["characterId"], CHEF);
    assert_eq!(scene["experience"], "explore");

    let missing = get(&app, &format!("/api/scenes/{}/999", CHEF)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["error"], "scene_not_found");
}

#[tokio::test]
async fn test_create_scene_then_list() {
    let app = test_app();
    let response = post_json(
        &app,
        "/api/scenes/create",
        json!({
            "characterId": CHEF,
            "title": "  Knife skills  ",
            "description": "Practice the julienne cut",
            "type": "Learn",
            "experience": "flashcard"
        }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    let scene = &body["scene"];
    assert_eq!(scene["id"], "14");
    assert_eq!(scene["title"], "Knife skills");
    assert_eq!(scene["experience"], "flashcard");
    assert!(!scene["rules"].as_array().unwrap().is_empty());

    let scenes = get(&app, &format!("/api/scenes?characterId={}", CHEF)).await;
    let scenes = scenes.json();
    let scenes = scenes.as_array().unwrap();
    assert_eq!(scenes.len(), 14);
    assert_eq!(scenes.last().unwrap()["title"], "Knife skills");

    let file = app.data_dir.path().join("scenes").join(format!("{}.json", CHEF));
    assert!(file.exists());
}

#[tokio::test]
async fn test_created_scene_survives_restart() {
    let app = test_app();
    let created = post_json(
        &app,
        "/api/scenes/create",
        json!({
            "characterId": "riff-kwan",
            "title": "Open mic",
            "description": "Five minutes of new material",
            "type": "Roleplay"
        }),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.json()["scene"]["id"].as_str().unwrap().to_string();

    let restarted = TestAppBuilder::new().data_dir(app.data_dir).build();
    let response = get(&restarted, &format!("/api/scenes/riff-kwan/{}", id)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["title"], "Open mic");
    assert_eq!(response.json()["experience"], "conversation");
}

#[tokio::test]
async fn test_create_scene_validation() {
    let app = test_app();

    let unknown = post_json(
        &app,
        "/api/scenes/create",
        json!({"characterId": "nobody", "title": "t", "description": "d", "type": "Game"}),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let blank_title = post_json(
        &app,
        "/api/scenes/create",
        json!({"characterId": CHEF, "title": "   ", "description": "d", "type": "Game"}),
    )
    .await;
    assert_eq!(blank_title.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank_title.json()["error"], "invalid_scene");

    let missing_type = post_json(
        &app,
        "/api/scenes/create",
        json!({"characterId": CHEF, "title": "t", "description": "d"}),
    )
    .await;
    assert_eq!(missing_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_type.json()["error"], "invalid_request");
}
