//! Generative model and speech synthesis clients.
//!
//! Handlers talk to vendors only through the [`GenerativeModel`] and
//! [`SpeechSynthesizer`] traits, so tests can substitute in-process mocks.
//!
//! - [`GeminiClient`]: Gemini `generateContent` REST API for text and images
//! - [`PlayHtClient`]: Play.ht streaming TTS endpoint

mod gemini;
mod playht;

pub use gemini::{GeminiClient, GEMINI_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
pub use playht::{PlayHtClient, DEFAULT_TTS_ENDPOINT};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::UpstreamError;

/// One piece of multimodal model input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Raw bytes with their MIME type; encoded to base64 on the wire.
    InlineData { mime_type: String, data: Bytes },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn png(data: impl Into<Bytes>) -> Self {
        Part::InlineData {
            mime_type: "image/png".to_string(),
            data: data.into(),
        }
    }
}

/// Image bytes returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data: Bytes,
    pub mime_type: String,
}

/// Text and image generation.
#[async_trait]
pub trait GenerativeModel: Send + Sync + 'static {
    /// Generate text from the given parts with the text model.
    ///
    /// Returns the concatenated text parts of the first candidate.
    async fn generate_text(&self, parts: Vec<Part>) -> Result<String, UpstreamError>;

    /// Generate an image from the given parts with the image model.
    ///
    /// Returns the first inline part whose MIME type starts with `image/`.
    async fn generate_image(&self, parts: Vec<Part>) -> Result<GeneratedImage, UpstreamError>;

    /// Name of the text model, reported back to chat clients.
    fn text_model(&self) -> &str;
}

/// Text-to-speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Whether credentials are present.
    fn is_configured(&self) -> bool;

    /// Synthesize `text` with `voice_id`, returning WAV bytes.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, UpstreamError>;
}
