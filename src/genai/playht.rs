//! Play.ht text-to-speech client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::UpstreamError;

use super::SpeechSynthesizer;

pub const DEFAULT_TTS_ENDPOINT: &str = "https://api.play.ht/playht-fal/playht-tts-ldm/stream";

const OUTPUT_FORMAT: &str = "wav";
const VOICE_ENGINE: &str = "PlayDialog";

/// [`SpeechSynthesizer`] backed by the Play.ht stream endpoint.
#[derive(Clone)]
pub struct PlayHtClient {
    client: Client,
    auth_key: Option<String>,
    endpoint: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice: &'a str,
    output_format: &'a str,
    voice_engine: &'a str,
}

impl PlayHtClient {
    pub fn new(
        auth_key: Option<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            auth_key: auth_key.filter(|k| !k.trim().is_empty()),
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for PlayHtClient {
    fn is_configured(&self) -> bool {
        self.auth_key.is_some()
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, UpstreamError> {
        let auth_key = self
            .auth_key
            .as_deref()
            .ok_or_else(|| UpstreamError::NotConfigured("TTS service not configured".to_string()))?;

        let body = SpeechRequest {
            text,
            voice: voice_id,
            output_format: OUTPUT_FORMAT,
            voice_engine: VOICE_ENGINE,
        };

        debug!(voice_id, chars = text.len(), "Sending TTS request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Key {}", auth_key))
            .header(header::ACCEPT, "*/*")
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(format!("Play.ai request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %message, "Play.ai API error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Request(format!("Failed to read audio body: {e}")))?;

        if audio.is_empty() {
            return Err(UpstreamError::EmptyAudio);
        }

        debug!(bytes = audio.len(), "Received audio");
        Ok(audio)
    }
}
