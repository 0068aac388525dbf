//! Text-to-speech endpoint.

use axum::http::StatusCode;
use base64::prelude::*;
use serde_json::json;

use tagalong::catalog::voice_for;
use tagalong::error::UpstreamError;

use super::test_utils::{get, post_json, test_app, MockSpeech, SpeechOutcome, TestAppBuilder, CHEF};

#[tokio::test]
async fn test_tts_strips_voice_directions() {
    let app = test_app();
    let text = "(Warm, enthusiastic voice) Welcome   to my kitchen!";
    let response = post_json(&app, "/api/tts", json!({"text": text, "characterId": CHEF})).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(
        body["audioUrl"],
        format!("data:audio/wav;base64,{}", BASE64_STANDARD.encode(b"RIFF0000WAVE"))
    );
    assert_eq!(body["format"], "wav");
    assert_eq!(body["characterId"], CHEF);
    assert_eq!(body["voiceId"], voice_for(CHEF).voice_id);
    assert_eq!(body["textLength"], "Welcome to my kitchen!".len());
    assert_eq!(body["originalTextLength"], text.chars().count());

    let (sent, _) = app.speech.last_request().unwrap();
    assert_eq!(sent, "Welcome to my kitchen!");
}

#[tokio::test]
async fn test_tts_requires_text() {
    let app = test_app();

    let blank = post_json(&app, "/api/tts", json!({"text": "  "})).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.json(), json!({"error": "Text is required"}));

    let missing = post_json(&app, "/api/tts", json!({"characterId": CHEF})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.speech.calls(), 0);
}

#[tokio::test]
async fn test_tts_not_configured() {
    let app = TestAppBuilder::new()
        .speech(MockSpeech::unconfigured())
        .build();
    let response = post_json(&app, "/api/tts", json!({"text": "Hello"})).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "TTS service not configured");
    assert_eq!(app.speech.calls(), 0);
}

#[tokio::test]
async fn test_tts_vendor_failures() {
    let cases = [
        (
            UpstreamError::Status {
                status: 401,
                message: "unauthorized".to_string(),
            },
            "TTS authentication failed",
        ),
        (
            UpstreamError::Status {
                status: 429,
                message: "slow down".to_string(),
            },
            "TTS rate limit exceeded",
        ),
        (UpstreamError::EmptyAudio, "TTS generated empty audio"),
        (
            UpstreamError::Request("connection reset".to_string()),
            "Failed to generate speech",
        ),
    ];

    for (err, expected) in cases {
        let app = TestAppBuilder::new()
            .speech(MockSpeech::new().with_outcome(SpeechOutcome::Fail(err)))
            .build();
        let response = post_json(&app, "/api/tts", json!({"text": "Hello"})).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json();
        assert_eq!(body["error"], expected);
        assert!(body["details"].is_string());
    }
}

#[tokio::test]
async fn test_tts_default_voice() {
    let app = test_app();
    let response = post_json(&app, "/api/tts", json!({"text": "Hi"})).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["characterId"].is_null());
    let (_, voice_id) = app.speech.last_request().unwrap();
    assert_eq!(voice_id, voice_for("default").voice_id);
}

#[tokio::test]
async fn test_tts_status() {
    let app = TestAppBuilder::new()
        .speech(MockSpeech::unconfigured())
        .build();
    let response = get(&app, "/api/tts").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "TTS API is running");
    assert_eq!(body["configured"], false);
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}
