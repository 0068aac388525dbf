//! Router configuration for Tagalong.
//!
//! # Route Structure
//!
//! ```text
//! /health                                  - Health check
//! /api/characters                          - Characters (GET, ?q= search)
//! /api/scenes                              - Scenes of a character (GET)
//! /api/scenes/create                       - Create a scene (POST)
//! /api/scenes/{characterId}/{sceneId}      - Single scene (GET)
//! /api/chat                                - Chat turn (POST), status (GET)
//! /api/chat/seed                           - Opening line (GET)
//! /api/quiz/generate                       - Quiz questions (POST)
//! /api/game-questions                      - Game round question (POST)
//! /api/game-image                          - Cached game round image (POST)
//! /api/game-dish-name                      - Final dish name (POST)
//! /api/game-dish-description               - Final dish description (POST)
//! /api/scene-image                         - Cached scene thumbnail (GET)
//! /api/character-image                     - Portrait from prompt (GET)
//! /api/explore-image                       - Tour stop image (POST)
//! /api/explore-step                        - Tour stop image + voice-over (POST)
//! /api/tts                                 - Speech (POST), status (GET)
//! ```

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    character_image_handler, characters_handler, chat_handler, chat_status_handler,
    create_scene_handler, dish_description_handler, dish_name_handler, explore_image_handler,
    explore_step_handler, game_image_handler, game_questions_handler, health_handler,
    quiz_handler, scene_handler, scene_image_handler, scenes_handler, seed_handler, tts_handler,
    tts_status_handler, AppState, DEFAULT_CACHE_MAX_AGE,
};
use crate::genai::{GenerativeModel, SpeechSynthesizer};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds for image responses
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is one day
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// The config's cache max-age overrides the one in `state`.
pub fn create_router<M, V>(state: AppState<M, V>, config: RouterConfig) -> Router
where
    M: GenerativeModel,
    V: SpeechSynthesizer,
{
    let state = state.with_cache_max_age(config.cache_max_age);
    let cors = build_cors_layer(&config);

    let api = Router::new()
        .route("/characters", get(characters_handler::<M, V>))
        .route("/scenes", get(scenes_handler::<M, V>))
        .route("/scenes/create", post(create_scene_handler::<M, V>))
        .route(
            "/scenes/{character_id}/{scene_id}",
            get(scene_handler::<M, V>),
        )
        .route(
            "/chat",
            get(chat_status_handler).post(chat_handler::<M, V>),
        )
        .route("/chat/seed", get(seed_handler::<M, V>))
        .route("/quiz/generate", post(quiz_handler::<M, V>))
        .route("/game-questions", post(game_questions_handler::<M, V>))
        .route("/game-image", post(game_image_handler::<M, V>))
        .route("/game-dish-name", post(dish_name_handler::<M, V>))
        .route(
            "/game-dish-description",
            post(dish_description_handler::<M, V>),
        )
        .route("/scene-image", get(scene_image_handler::<M, V>))
        .route("/character-image", get(character_image_handler::<M, V>))
        .route("/explore-image", post(explore_image_handler::<M, V>))
        .route("/explore-step", post(explore_step_handler::<M, V>))
        .route(
            "/tts",
            get(tts_status_handler::<M, V>).post(tts_handler::<M, V>),
        );

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::HEAD, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
