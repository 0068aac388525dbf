//! HTTP request handlers for the Tagalong API.
//!
//! Each handler is independent: a failure in one never affects another.
//! Text endpoints substitute fallback content when the model fails, image
//! endpoints surface the error.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/characters` - Character list and search
//! - `GET|POST /api/scenes...` - Scene listing, lookup and creation
//! - `GET|POST /api/chat...` - Chat turns and opening lines
//! - `POST /api/quiz/generate`, `POST /api/game-*` - Experience content
//! - `GET /api/scene-image`, `POST /api/game-image` - Cached images
//! - `GET /api/character-image`, `POST /api/explore-*` - Uncached images
//! - `GET|POST /api/tts` - Text-to-speech

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::asset::{to_data_url, AssetResponse, AssetService, GameImageRequest};
use crate::catalog::{
    voice_for, Character, CharacterCatalog, NewScene, Scene, SceneStore, TourCatalog,
};
use crate::error::{ApiError, AssetError, StoreError, UpstreamError};
use crate::experience::text::{clean_voice_directions, normalize_paragraphs, strip_code_fences};
use crate::experience::{
    fallback, last_user_message, prompts, ChatMessage, GameQuestion, GameState, QuizContext,
    QuizQuestion,
};
use crate::genai::{GenerativeModel, Part, SpeechSynthesizer};

/// Default `Cache-Control` max-age for generated images (one day).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 86400;

/// Response header reporting whether an image came from the cache.
pub const ASSET_CACHE_HIT_HEADER: &str = "X-Asset-Cache-Hit";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<M: GenerativeModel, V: SpeechSynthesizer> {
    /// Text and image model
    pub model: Arc<M>,

    /// Text-to-speech vendor
    pub speech: Arc<V>,

    /// Cached image generation
    pub assets: Arc<AssetService<M>>,

    pub characters: Arc<CharacterCatalog>,
    pub scenes: Arc<SceneStore>,
    pub tours: Arc<TourCatalog>,

    /// Cache-Control max-age for image responses, in seconds
    pub cache_max_age: u32,
}

impl<M: GenerativeModel, V: SpeechSynthesizer> AppState<M, V> {
    pub fn new(
        model: Arc<M>,
        speech: Arc<V>,
        assets: AssetService<M>,
        characters: Arc<CharacterCatalog>,
        scenes: Arc<SceneStore>,
        tours: Arc<TourCatalog>,
    ) -> Self {
        Self {
            model,
            speech,
            assets: Arc::new(assets),
            characters,
            scenes,
            tours,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }

    /// Set the Cache-Control max-age for image responses.
    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    fn character(&self, character_id: &str) -> Result<&Character, ApiError> {
        self.characters
            .get(character_id)
            .ok_or_else(|| ApiError::CharacterNotFound(character_id.to_string()))
    }
}

impl<M: GenerativeModel, V: SpeechSynthesizer> Clone for AppState<M, V> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            speech: Arc::clone(&self.speech),
            assets: Arc::clone(&self.assets),
            characters: Arc::clone(&self.characters),
            scenes: Arc::clone(&self.scenes),
            tours: Arc::clone(&self.tours),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CharactersQueryParams {
    /// Case-insensitive search string
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenesQueryParams {
    #[serde(default)]
    pub character_id: Option<String>,
}

/// Query parameters naming a scene of a character.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneQueryParams {
    #[serde(default)]
    pub character_id: Option<String>,
    #[serde(default)]
    pub scene_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CharacterImageQueryParams {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub character_id: Option<String>,
    #[serde(default)]
    pub scene_id: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    /// Present when the user asked for help with a quiz question
    #[serde(default)]
    pub quiz_context: Option<QuizContext>,
    /// Progress of the game on screen, folded into the scene description
    #[serde(default)]
    pub game_state: Option<GameState>,
    /// First-round question shown before the game begins
    #[serde(default)]
    pub game_preview: Option<GameQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub character_id: String,
    #[serde(default)]
    pub scene_id: String,
    pub scene_title: String,
    #[serde(default)]
    pub scene_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameQuestionsRequest {
    pub character_id: String,
    #[serde(default)]
    pub scene_id: String,
    /// e.g. `cooking-showdown`
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub previous_choices: Vec<String>,
    pub current_round: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameImageBody {
    pub character_id: String,
    pub scene_id: String,
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub previous_choices: Vec<String>,
    #[serde(default)]
    pub current_prompt: String,
    /// Base64 of the previous round's image
    #[serde(default)]
    pub base_image_data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishRequest {
    pub character_id: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub game_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreRequest {
    #[serde(default)]
    pub character_id: Option<String>,
    #[serde(default)]
    pub tour_id: Option<String>,
    #[serde(default)]
    pub stop_id: Option<String>,
    /// 0 for the stop itself, 1 or 2 for its deeper levels
    #[serde(default)]
    pub depth: u8,
    /// Titles of stops visited so far
    #[serde(default)]
    pub previous_choices: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub character_id: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "character_not_found", "invalid_request")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// A character as listed to clients, with its resolved portrait URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    #[serde(flatten)]
    pub character: Character,
    pub portrait_url: String,
}

impl From<Character> for CharacterView {
    fn from(character: Character) -> Self {
        Self {
            portrait_url: character.portrait_url(),
            character,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSceneResponse {
    pub scene: Scene,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    /// Text model that produced the reply
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct DishNameResponse {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DishDescriptionResponse {
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreImageResponse {
    /// `data:` URL of the generated image
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub stop_id: String,
    pub depth: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreStepResponse {
    /// `null` when image generation failed
    pub image_url: Option<String>,
    /// `null` when voice-over generation failed
    pub voice_description: Option<String>,
    pub title: String,
    pub description: String,
    pub stop_id: String,
    pub depth: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsResponse {
    /// `data:audio/wav;base64,...`
    pub audio_url: String,
    pub format: String,
    pub character_id: Option<String>,
    pub voice_id: String,
    /// Characters after voice directions were removed
    pub text_length: usize,
    pub original_text_length: usize,
}

#[derive(Debug, Serialize)]
pub struct TtsStatusResponse {
    pub status: String,
    pub configured: bool,
    /// ISO-8601 UTC
    pub timestamp: String,
}

/// Error body of the TTS endpoint.
#[derive(Debug, Serialize)]
pub struct TtsErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// =============================================================================
// Error Mapping
// =============================================================================

type Classified = (StatusCode, &'static str, String);

fn classify_store(err: &StoreError) -> Classified {
    match err {
        StoreError::CharacterNotFound(_) => {
            (StatusCode::NOT_FOUND, "character_not_found", err.to_string())
        }
        StoreError::SceneNotFound { .. } => {
            (StatusCode::NOT_FOUND, "scene_not_found", err.to_string())
        }
        StoreError::InvalidScene(_) => (StatusCode::BAD_REQUEST, "invalid_scene", err.to_string()),
        StoreError::Io { .. } | StoreError::Parse { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            err.to_string(),
        ),
    }
}

fn classify_upstream(err: &UpstreamError) -> Classified {
    match err {
        UpstreamError::NotConfigured(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "upstream_not_configured",
            err.to_string(),
        ),
        _ => (StatusCode::BAD_GATEWAY, "upstream_error", err.to_string()),
    }
}

fn classify_asset(err: &AssetError) -> Classified {
    match err {
        AssetError::GenerationDisabled => (
            StatusCode::SERVICE_UNAVAILABLE,
            "generation_disabled",
            err.to_string(),
        ),
        AssetError::CharacterNotFound(_) => {
            (StatusCode::NOT_FOUND, "character_not_found", err.to_string())
        }
        AssetError::InvalidKey(_) => (StatusCode::BAD_REQUEST, "invalid_key", err.to_string()),
        AssetError::ReferenceImageMissing(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "reference_image_missing",
            err.to_string(),
        ),
        AssetError::MissingBaseImage | AssetError::InvalidBaseImage(_) => (
            StatusCode::BAD_REQUEST,
            "invalid_base_image",
            err.to_string(),
        ),
        AssetError::Io(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "cache_error",
            err.to_string(),
        ),
        AssetError::Store(inner) => classify_store(inner),
        AssetError::Upstream(inner) => classify_upstream(inner),
    }
}

impl ApiError {
    fn classify(&self) -> Classified {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "invalid_request", message.clone())
            }
            ApiError::CharacterNotFound(_) => {
                (StatusCode::NOT_FOUND, "character_not_found", self.to_string())
            }
            ApiError::SceneNotFound(_) => {
                (StatusCode::NOT_FOUND, "scene_not_found", self.to_string())
            }
            ApiError::TourNotFound(_) | ApiError::StopNotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found", self.to_string())
            }
            ApiError::InvalidDepth(_) => {
                (StatusCode::BAD_REQUEST, "invalid_depth", self.to_string())
            }
            ApiError::Store(inner) => classify_store(inner),
            ApiError::Asset(inner) => classify_asset(inner),
            ApiError::Upstream(inner) => classify_upstream(inner),
        }
    }
}

/// Convert ApiError to HTTP response.
///
/// - 5xx errors are logged at ERROR level
/// - 404s at DEBUG level
/// - other 4xx errors at WARN level
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.classify();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

/// Malformed JSON bodies are reported as 400 with axum's rejection text.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Errors of the TTS endpoint, which keeps its own `{error, details}` body.
#[derive(Debug)]
pub enum TtsError {
    EmptyText,
    NotConfigured,
    Synthesis(UpstreamError),
}

/// Client-facing message for a failed synthesis.
pub fn tts_failure_message(err: &UpstreamError) -> &'static str {
    match err {
        UpstreamError::Status { status: 401, .. } => "TTS authentication failed",
        UpstreamError::Status { status: 429, .. } => "TTS rate limit exceeded",
        UpstreamError::EmptyAudio => "TTS generated empty audio",
        UpstreamError::NotConfigured(_) => "TTS service not configured",
        _ => "Failed to generate speech",
    }
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            TtsError::EmptyText => (
                StatusCode::BAD_REQUEST,
                TtsErrorResponse {
                    error: "Text is required".to_string(),
                    details: None,
                },
            ),
            TtsError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                TtsErrorResponse {
                    error: "TTS service not configured".to_string(),
                    details: None,
                },
            ),
            TtsError::Synthesis(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                TtsErrorResponse {
                    error: tts_failure_message(err).to_string(),
                    details: Some(err.to_string()),
                },
            ),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "TTS error: {}", body.error);
        } else {
            warn!(status = status.as_u16(), "TTS client error: {}", body.error);
        }

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Treat blank strings like missing ones.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Image response with caching headers.
fn asset_response(asset: AssetResponse, cache_max_age: u32) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, asset.content_type)
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}, immutable", cache_max_age),
        )
        .header(header::ETAG, format!("\"{}\"", asset.etag))
        .header(ASSET_CACHE_HIT_HEADER, asset.cache_hit.to_string())
        .body(Body::from(asset.data))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Parse the model's quiz output, rejecting malformed questions.
pub fn parse_quiz_questions(text: &str) -> Option<Vec<QuizQuestion>> {
    let questions: Vec<QuizQuestion> = serde_json::from_str(&strip_code_fences(text)).ok()?;
    let valid = !questions.is_empty()
        && questions
            .iter()
            .all(|q| q.options.len() >= 2 && q.correct_answer < q.options.len());
    valid.then_some(questions)
}

/// Parse the model's game question output.
pub fn parse_game_question(text: &str) -> Option<GameQuestion> {
    let question: GameQuestion = serde_json::from_str(&strip_code_fences(text)).ok()?;
    (!question.options.is_empty()).then_some(question)
}

// =============================================================================
// Handlers: catalog
// =============================================================================

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/characters?q=`
///
/// All characters, or the search results for `q`, each with a `portraitUrl`.
pub async fn characters_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    Query(query): Query<CharactersQueryParams>,
) -> Json<Vec<CharacterView>> {
    let characters = match present(query.q) {
        Some(q) => state.characters.search(&q),
        None => state.characters.all().to_vec(),
    };
    Json(characters.into_iter().map(CharacterView::from).collect())
}

/// `GET /api/scenes?characterId=`
///
/// # Errors
///
/// - `400 Bad Request`: `characterId` missing
/// - `404 Not Found`: unknown character
pub async fn scenes_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    Query(query): Query<ScenesQueryParams>,
) -> Result<Json<Vec<Scene>>, ApiError> {
    let character_id = present(query.character_id)
        .ok_or_else(|| ApiError::BadRequest("characterId required".to_string()))?;
    state.character(&character_id)?;

    Ok(Json(state.scenes.scenes_for(&character_id).await))
}

/// `GET /api/scenes/{characterId}/{sceneId}`
pub async fn scene_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    Path((character_id, scene_id)): Path<(String, String)>,
) -> Result<Json<Scene>, ApiError> {
    state.character(&character_id)?;
    Ok(Json(state.scenes.get(&character_id, &scene_id).await?))
}

/// `POST /api/scenes/create`
///
/// Body: `{characterId, title, description, type, experience?}`.
pub async fn create_scene_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<NewScene>, JsonRejection>,
) -> Result<Json<CreateSceneResponse>, ApiError> {
    let new_scene = json_body(body)?;
    state.character(&new_scene.character_id)?;

    let scene = state.scenes.create(new_scene).await?;
    Ok(Json(CreateSceneResponse {
        scene,
        success: true,
    }))
}

// =============================================================================
// Handlers: chat
// =============================================================================

/// `POST /api/chat`
///
/// Unknown characters or scenes are not an error: the prompt falls back to a
/// generic assistant. Model failures are answered with an echo of the last
/// user message.
pub async fn chat_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = json_body(body)?;
    let (Some(character_id), Some(scene_id), Some(messages)) = (
        present(request.character_id),
        present(request.scene_id),
        request.messages,
    ) else {
        return Err(ApiError::BadRequest("invalid request".to_string()));
    };

    let character = state.characters.get(&character_id);
    let mut scene = state.scenes.find(&character_id, &scene_id).await;
    if let (Some(game), Some(scene)) = (&request.game_state, scene.as_mut()) {
        let context = game.chat_context(&scene.title, request.game_preview.as_ref());
        let description = scene.description.take().unwrap_or_default();
        scene.description = Some(description + &context);
    }
    let system_prompt =
        prompts::chat_system_prompt(character, scene.as_ref(), request.quiz_context.as_ref());
    let prompt = prompts::chat_prompt(&system_prompt, &messages);

    let message = match state.model.generate_text(vec![Part::text(prompt)]).await {
        Ok(text) => normalize_paragraphs(&text),
        Err(e) => {
            warn!(%character_id, %scene_id, error = %e, "Chat generation failed, using fallback");
            fallback::chat_fallback(last_user_message(&messages))
        }
    };

    Ok(Json(ChatResponse {
        message,
        model: state.model.text_model().to_string(),
    }))
}

/// `GET /api/chat`
pub async fn chat_status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

/// `GET /api/chat/seed?characterId&sceneId`
///
/// Opening line for a scene.
pub async fn seed_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    Query(query): Query<SceneQueryParams>,
) -> Result<Json<SeedResponse>, ApiError> {
    let (Some(character_id), Some(scene_id)) =
        (present(query.character_id), present(query.scene_id))
    else {
        return Err(ApiError::BadRequest(
            "characterId and sceneId required".to_string(),
        ));
    };

    let character = state.character(&character_id)?;
    let scene = state
        .scenes
        .find(&character_id, &scene_id)
        .await
        .ok_or_else(|| ApiError::SceneNotFound(scene_id.clone()))?;

    let prompt = prompts::seed_prompt(character, &scene);
    let message = match state.model.generate_text(vec![Part::text(prompt)]).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(%character_id, %scene_id, error = %e, "Seed generation failed, using fallback");
            fallback::SEED_FALLBACK.to_string()
        }
    };

    Ok(Json(SeedResponse { message }))
}

// =============================================================================
// Handlers: experiences
// =============================================================================

/// `POST /api/quiz/generate`
///
/// Falls back to the static question set when the model fails, returns
/// something unparsable, or the character is unknown.
pub async fn quiz_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, ApiError> {
    let request = json_body(body)?;

    let generated = match state.characters.get(&request.character_id) {
        Some(character) => {
            let prompt = prompts::quiz_prompt(
                character,
                &request.scene_title,
                request.scene_description.as_deref(),
            );
            match state.model.generate_text(vec![Part::text(prompt)]).await {
                Ok(text) => {
                    let parsed = parse_quiz_questions(&text);
                    if parsed.is_none() {
                        warn!(scene_id = %request.scene_id, "Unparsable quiz from model, using fallback");
                    }
                    parsed
                }
                Err(e) => {
                    warn!(scene_id = %request.scene_id, error = %e, "Quiz generation failed, using fallback");
                    None
                }
            }
        }
        None => None,
    };

    let questions =
        generated.unwrap_or_else(|| fallback::quiz_questions(&request.scene_title));

    Ok(Json(QuizResponse {
        questions,
        success: true,
    }))
}

/// `POST /api/game-questions`
///
/// Next round's question; static per-round fallback on model failure.
pub async fn game_questions_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<GameQuestionsRequest>, JsonRejection>,
) -> Result<Json<GameQuestion>, ApiError> {
    let request = json_body(body)?;
    let character = state.character(&request.character_id)?;

    let session = Utc::now().timestamp_millis().unsigned_abs();
    let prompt = prompts::game_question_prompt(
        character,
        &request.game_type,
        &request.previous_choices,
        request.current_round,
        session,
    );

    info!(
        character_id = %request.character_id,
        scene_id = %request.scene_id,
        round = request.current_round,
        "Generating game question"
    );

    let question = match state.model.generate_text(vec![Part::text(prompt)]).await {
        Ok(text) => parse_game_question(&text).unwrap_or_else(|| {
            warn!(round = request.current_round, "Unparsable game question, using fallback");
            fallback::game_question(request.current_round)
        }),
        Err(e) => {
            warn!(round = request.current_round, error = %e, "Game question generation failed, using fallback");
            fallback::game_question(request.current_round)
        }
    };

    Ok(Json(question))
}

/// `POST /api/game-dish-name`
pub async fn dish_name_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<DishRequest>, JsonRejection>,
) -> Result<Json<DishNameResponse>, ApiError> {
    let request = json_body(body)?;
    let character = state.character(&request.character_id)?;

    let prompt = prompts::dish_name_prompt(character, &request.choices);
    let name = state.model.generate_text(vec![Part::text(prompt)]).await?;

    Ok(Json(DishNameResponse {
        name: name.trim().to_string(),
    }))
}

/// `POST /api/game-dish-description`
pub async fn dish_description_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<DishRequest>, JsonRejection>,
) -> Result<Json<DishDescriptionResponse>, ApiError> {
    let request = json_body(body)?;
    let character = state.character(&request.character_id)?;

    let prompt = prompts::dish_description_prompt(character, &request.choices);
    let description = state.model.generate_text(vec![Part::text(prompt)]).await?;

    Ok(Json(DishDescriptionResponse {
        description: description.trim().to_string(),
    }))
}

// =============================================================================
// Handlers: images
// =============================================================================

/// `GET /api/scene-image?characterId&sceneId`
///
/// # Headers
///
/// - `Content-Type`: sniffed from the bytes
/// - `Cache-Control: public, max-age={cache_max_age}, immutable`
/// - `ETag`: SHA-256 of the bytes
/// - `X-Asset-Cache-Hit: true|false`
pub async fn scene_image_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    Query(query): Query<SceneQueryParams>,
) -> Result<Response, ApiError> {
    let character_id = present(query.character_id).unwrap_or_else(|| "unknown".to_string());
    let scene_id = present(query.scene_id).unwrap_or_else(|| "0".to_string());

    let asset = state
        .assets
        .get_scene_image(&character_id, &scene_id)
        .await?;
    Ok(asset_response(asset, state.cache_max_age))
}

/// `POST /api/game-image`
///
/// Same headers as the scene image endpoint.
pub async fn game_image_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<GameImageBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    if !state.assets.generation_enabled() {
        return Err(AssetError::GenerationDisabled.into());
    }
    let body = json_body(body)?;

    let request = GameImageRequest {
        character_id: body.character_id,
        scene_id: body.scene_id,
        round: body.round,
        previous_choices: body.previous_choices,
        current_prompt: body.current_prompt,
        base_image_data: body.base_image_data,
    };
    let asset = state.assets.get_game_image(&request).await?;
    Ok(asset_response(asset, state.cache_max_age))
}

/// `GET /api/character-image?prompt=`
///
/// Uncached bust portrait with the model's MIME type.
pub async fn character_image_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    Query(query): Query<CharacterImageQueryParams>,
) -> Result<Response, ApiError> {
    let prompt =
        present(query.prompt).ok_or_else(|| ApiError::BadRequest("prompt required".to_string()))?;

    let image = state.assets.generate_character_image(&prompt).await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, image.mime_type)
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}, immutable", state.cache_max_age),
        )
        .body(Body::from(image.data))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

/// Stop content resolved from an explore request.
struct ResolvedStop {
    character_id: String,
    stop_id: String,
    depth: u8,
    title: String,
    description: String,
    image_prompt: String,
}

fn resolve_stop(tours: &TourCatalog, request: &ExploreRequest) -> Result<ResolvedStop, ApiError> {
    let (Some(character_id), Some(tour_id), Some(stop_id)) = (
        present(request.character_id.clone()),
        present(request.tour_id.clone()),
        present(request.stop_id.clone()),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing required parameters".to_string(),
        ));
    };

    let tour = tours
        .get(&character_id, &tour_id)
        .ok_or_else(|| ApiError::TourNotFound(tour_id.clone()))?;
    let stop = tour
        .stop(&stop_id)
        .ok_or_else(|| ApiError::StopNotFound(stop_id.clone()))?;
    let view = stop
        .at_depth(request.depth)
        .ok_or(ApiError::InvalidDepth(request.depth))?;

    Ok(ResolvedStop {
        title: view.title.to_string(),
        description: view.description.to_string(),
        image_prompt: view.image_prompt.to_string(),
        character_id,
        stop_id,
        depth: request.depth,
    })
}

/// `POST /api/explore-image`
///
/// 9:16 image for a tour stop at a depth, returned inline as a data URL.
pub async fn explore_image_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<ExploreRequest>, JsonRejection>,
) -> Result<Json<ExploreImageResponse>, ApiError> {
    let request = json_body(body)?;
    let stop = resolve_stop(&state.tours, &request)?;

    info!(
        character_id = %stop.character_id,
        stop_id = %stop.stop_id,
        depth = stop.depth,
        title = %stop.title,
        "Generating explore image"
    );

    let prompt = prompts::explore_portrait_prompt(&stop.image_prompt, &request.previous_choices);
    let image = state
        .assets
        .generate_styled_image(&stop.character_id, prompt)
        .await?;

    Ok(Json(ExploreImageResponse {
        image_url: to_data_url(&image.mime_type, &image.data),
        title: stop.title,
        description: stop.description,
        stop_id: stop.stop_id,
        depth: stop.depth,
    }))
}

/// `POST /api/explore-step`
///
/// Image and voice-over generated concurrently; either half is `null` when
/// its generation fails.
pub async fn explore_step_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<ExploreRequest>, JsonRejection>,
) -> Result<Json<ExploreStepResponse>, ApiError> {
    let request = json_body(body)?;
    let stop = resolve_stop(&state.tours, &request)?;

    if !state.assets.generation_enabled() {
        return Err(AssetError::GenerationDisabled.into());
    }

    let character_name = state
        .characters
        .get(&stop.character_id)
        .map_or(stop.character_id.as_str(), |c| c.name.as_str());
    let image_prompt =
        prompts::explore_portrait_prompt(&stop.image_prompt, &request.previous_choices);
    let voice_prompt =
        prompts::explore_voice_prompt(character_name, &stop.title, &stop.image_prompt);

    info!(
        character_id = %stop.character_id,
        stop_id = %stop.stop_id,
        depth = stop.depth,
        "Generating explore step"
    );

    let (image, voice) = tokio::join!(
        state
            .assets
            .generate_styled_image(&stop.character_id, image_prompt),
        state.model.generate_text(vec![Part::text(voice_prompt)]),
    );

    let image_url = match image {
        Ok(image) => Some(to_data_url(&image.mime_type, &image.data)),
        Err(e) => {
            warn!(stop_id = %stop.stop_id, error = %e, "Explore image generation failed");
            None
        }
    };
    let voice_description = match voice {
        Ok(text) => Some(text.trim().to_string()),
        Err(e) => {
            warn!(stop_id = %stop.stop_id, error = %e, "Explore voice-over generation failed");
            None
        }
    };

    Ok(Json(ExploreStepResponse {
        image_url,
        voice_description,
        title: stop.title,
        description: stop.description,
        stop_id: stop.stop_id,
        depth: stop.depth,
    }))
}

// =============================================================================
// Handlers: speech
// =============================================================================

/// `POST /api/tts`
///
/// Voice directions such as "(warmly)" are removed before synthesis.
pub async fn tts_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
    body: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Json<TtsResponse>, TtsError> {
    let request = body.map(|Json(r)| r).map_err(|_| TtsError::EmptyText)?;
    let text = present(request.text).ok_or(TtsError::EmptyText)?;

    if !state.speech.is_configured() {
        return Err(TtsError::NotConfigured);
    }

    let cleaned = clean_voice_directions(&text);
    let voice = voice_for(request.character_id.as_deref().unwrap_or("default"));

    debug!(
        character_id = ?request.character_id,
        voice_id = voice.voice_id,
        cleaned = cleaned != text.trim(),
        "Synthesizing speech"
    );

    let audio = state
        .speech
        .synthesize(&cleaned, voice.voice_id)
        .await
        .map_err(TtsError::Synthesis)?;

    info!(
        character_id = ?request.character_id,
        bytes = audio.len(),
        "Speech synthesized"
    );

    Ok(Json(TtsResponse {
        audio_url: format!("data:audio/wav;base64,{}", BASE64_STANDARD.encode(&audio)),
        format: "wav".to_string(),
        character_id: request.character_id,
        voice_id: voice.voice_id.to_string(),
        text_length: cleaned.chars().count(),
        original_text_length: text.chars().count(),
    }))
}

/// `GET /api/tts`
pub async fn tts_status_handler<M: GenerativeModel, V: SpeechSynthesizer>(
    State(state): State<AppState<M, V>>,
) -> Json<TtsStatusResponse> {
    Json(TtsStatusResponse {
        status: "TTS API is running".to_string(),
        configured: state.speech.is_configured(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
