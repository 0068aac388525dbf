//! Gemini REST client.
//!
//! Calls `POST {base}/{model}:generateContent?key=...` directly. Text and
//! image generation use separately configured models.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::UpstreamError;

use super::{GeneratedImage, GenerativeModel, Part};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// [`GenerativeModel`] backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Create a client. A missing key makes every call fail with
    /// [`UpstreamError::NotConfigured`].
    pub fn new(
        api_key: Option<String>,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: GEMINI_BASE_URL.to_string(),
            text_model: text_model.into(),
            image_model: image_model.into(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: Vec<Part>,
    ) -> Result<GenerateContentResponse, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::NotConfigured("Missing GOOGLE_API_KEY".to_string()))?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: parts.into_iter().map(WirePart::from).collect(),
            }],
        };

        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = model,
            api_key = api_key
        );

        debug!(model, "Sending generateContent request");

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| UpstreamError::Request(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response
            .json()
            .await
            .map_err(|err| UpstreamError::Decode(format!("Failed to parse Gemini response: {err}")))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_text(&self, parts: Vec<Part>) -> Result<String, UpstreamError> {
        let response = self.generate_content(&self.text_model, parts).await?;
        extract_text(response)
    }

    async fn generate_image(&self, parts: Vec<Part>) -> Result<GeneratedImage, UpstreamError> {
        let response = self.generate_content(&self.image_model, parts).await?;
        extract_image(response)
    }

    fn text_model(&self) -> &str {
        &self.text_model
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

impl From<Part> for WirePart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(text) => WirePart::Text { text },
            Part::InlineData { mime_type, data } => WirePart::InlineData {
                inline_data: InlineDataPayload {
                    mime_type,
                    data: BASE64_STANDARD.encode(&data),
                },
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineDataPayload>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

// =============================================================================
// Response Handling
// =============================================================================

fn first_candidate_parts(response: GenerateContentResponse) -> Vec<PartResponse> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

fn extract_text(response: GenerateContentResponse) -> Result<String, UpstreamError> {
    let text: String = first_candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(UpstreamError::EmptyText);
    }
    Ok(text)
}

fn extract_image(response: GenerateContentResponse) -> Result<GeneratedImage, UpstreamError> {
    let payload = first_candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.inline_data)
        .find(|inline| inline.mime_type.starts_with("image/") && !inline.data.is_empty())
        .ok_or(UpstreamError::NoImage)?;

    let data = BASE64_STANDARD
        .decode(payload.data.as_bytes())
        .map_err(|e| UpstreamError::Decode(format!("Invalid base64 image data: {e}")))?;

    Ok(GeneratedImage {
        data: Bytes::from(data),
        mime_type: payload.mime_type,
    })
}

fn map_http_error(status: StatusCode, body: String) -> UpstreamError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    UpstreamError::Status {
        status: status.as_u16(),
        message,
    }
}
