//! Explore tour image and step endpoints.

use axum::http::StatusCode;
use base64::prelude::*;
use serde_json::json;

use tagalong::genai::Part;

use super::test_utils::{post_json, test_app, MockModel, TestAppBuilder, CHEF, TEST_PNG};

fn explore_body(stop_id: &str, depth: u8) -> serde_json::Value {
    json!({
        "characterId": CHEF,
        "tourId": "venice-food-tour",
        "stopId": stop_id,
        "depth": depth,
        "previousChoices": ["Rialto Market"]
    })
}

#[tokio::test]
async fn test_explore_image_at_depth() {
    let app = test_app();
    let response = post_json(&app, "/api/explore-image", explore_body("stop-1", 1)).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["title"], "Fresh Catch Selection");
    assert_eq!(body["stopId"], "stop-1");
    assert_eq!(body["depth"], 1);
    assert_eq!(
        body["imageUrl"],
        format!("data:image/png;base64,{}", BASE64_STANDARD.encode(TEST_PNG))
    );

    let parts = app.model.last_image_parts();
    assert_eq!(parts[0], Part::png(TEST_PNG));
    match &parts[1] {
        Part::Text(prompt) => assert!(prompt.contains("Rialto Market")),
        other => panic!("expected a text part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_explore_image_is_not_cached() {
    let app = test_app();
    post_json(&app, "/api/explore-image", explore_body("stop-2", 0)).await;
    post_json(&app, "/api/explore-image", explore_body("stop-2", 0)).await;

    assert_eq!(app.model.image_calls(), 2);
}

#[tokio::test]
async fn test_explore_invalid_depth() {
    let app = test_app();
    let response = post_json(&app, "/api/explore-image", explore_body("stop-1", 3)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "invalid_depth");
    assert_eq!(app.model.image_calls(), 0);
}

#[tokio::test]
async fn test_explore_unknown_tour_and_stop() {
    let app = test_app();

    let stop = post_json(&app, "/api/explore-image", explore_body("stop-99", 0)).await;
    assert_eq!(stop.status, StatusCode::NOT_FOUND);

    let mut body = explore_body("stop-1", 0);
    body["tourId"] = json!("paris-pastry-tour");
    let tour = post_json(&app, "/api/explore-step", body).await;
    assert_eq!(tour.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_explore_missing_parameters() {
    let app = test_app();
    let response = post_json(
        &app,
        "/api/explore-step",
        json!({"characterId": CHEF, "stopId": "stop-1"}),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Missing required parameters");
}

#[tokio::test]
async fn test_explore_step_image_and_voice() {
    let app = TestAppBuilder::new()
        .model(MockModel::new().with_text("  Gulls wheel over the fish stalls. "))
        .build();
    let response = post_json(&app, "/api/explore-step", explore_body("stop-5", 2)).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert!(body["imageUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(body["voiceDescription"], "Gulls wheel over the fish stalls.");
    assert_eq!(body["stopId"], "stop-5");
    assert_eq!(body["depth"], 2);

    assert_eq!(app.model.image_calls(), 1);
    assert_eq!(app.model.text_calls(), 1);
    assert!(app
        .model
        .last_text_prompt()
        .unwrap()
        .contains("Chef Nomi Delgado"));
}

#[tokio::test]
async fn test_explore_step_image_failure_yields_null() {
    let app = TestAppBuilder::new()
        .model(MockModel::new().failing_image())
        .build();
    let response = post_json(&app, "/api/explore-step", explore_body("stop-3", 0)).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert!(body["imageUrl"].is_null());
    assert!(body["voiceDescription"].is_string());
    assert_eq!(body["title"], "Gelateria by the Canal");
}

#[tokio::test]
async fn test_explore_step_voice_failure_yields_null() {
    let app = TestAppBuilder::new()
        .model(MockModel::new().failing_text())
        .build();
    let response = post_json(&app, "/api/explore-step", explore_body("stop-4", 1)).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert!(body["imageUrl"].is_string());
    assert!(body["voiceDescription"].is_null());
}

#[tokio::test]
async fn test_explore_step_disabled() {
    let app = TestAppBuilder::new().generation_disabled().build();
    let response = post_json(&app, "/api/explore-step", explore_body("stop-1", 0)).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.model.text_calls(), 0);
    assert_eq!(app.model.image_calls(), 0);
}
