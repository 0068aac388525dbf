//! # Tagalong
//!
//! Backend for Tagalong: conversations with AI characters across chat,
//! quiz, flashcard, progressive game and explore experiences.
//!
//! The server proxies a generative text/image model and a text-to-speech
//! vendor, and keeps generated images in a write-once disk cache so each
//! image is only ever paid for once.
//!
//! ## Architecture
//!
//! - [`catalog`] - Characters, scenes (flat-file store), explore tours, voices
//! - [`experience`] - Prompts, fallbacks, text cleanup, game/quiz/explore state
//! - [`asset`] - Generated-image cache and generation service
//! - [`genai`] - Gemini and Play.ht clients behind async traits
//! - [`server`] - Axum handlers and router
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tagalong::asset::{AssetCache, AssetService, DEFAULT_MEMORY_CAPACITY};
//! use tagalong::catalog::{CharacterCatalog, SceneStore, TourCatalog};
//! use tagalong::genai::{GeminiClient, PlayHtClient, DEFAULT_TTS_ENDPOINT};
//! use tagalong::server::{create_router, AppState, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let timeout = Duration::from_secs(120);
//!     let model = Arc::new(GeminiClient::new(
//!         std::env::var("GOOGLE_API_KEY").ok(),
//!         "gemini-2.0-flash-exp",
//!         "gemini-2.5-flash-image-preview",
//!         timeout,
//!     )?);
//!     let speech = Arc::new(PlayHtClient::new(None, DEFAULT_TTS_ENDPOINT, timeout)?);
//!
//!     let characters = Arc::new(CharacterCatalog::builtin()?);
//!     let scenes = Arc::new(SceneStore::with_builtin("data")?);
//!     let tours = Arc::new(TourCatalog::builtin()?);
//!
//!     let assets = AssetService::new(
//!         Arc::clone(&model),
//!         AssetCache::new("data", DEFAULT_MEMORY_CAPACITY),
//!         Arc::clone(&characters),
//!         Arc::clone(&scenes),
//!         "public",
//!         model.has_api_key(),
//!     );
//!     let state = AppState::new(model, speech, assets, characters, scenes, tours);
//!     let router = create_router(state, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod asset;
pub mod catalog;
pub mod config;
pub mod error;
pub mod experience;
pub mod genai;
pub mod server;

// Re-export commonly used types
pub use asset::{AssetCache, AssetKey, AssetResponse, AssetService, GameImageRequest};
pub use catalog::{Character, CharacterCatalog, Scene, SceneStore, Tour, TourCatalog};
pub use config::{Cli, Command, InitScenesConfig, ServeConfig};
pub use error::{ApiError, AssetError, StoreError, UpstreamError};
pub use experience::{ExploreState, GameState, QuizState, TransitionError};
pub use genai::{GeminiClient, GenerativeModel, Part, PlayHtClient, SpeechSynthesizer};
pub use server::{create_router, AppState, RouterConfig};
