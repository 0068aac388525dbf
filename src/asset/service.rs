//! Asset service: cache lookup first, generation on miss.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        AssetService                          │
//! │  1. Gate on generation being enabled (503 otherwise)         │
//! │  2. Build and validate the cache key                         │
//! │  3. Resolve the character                                    │
//! │  4. Memory → disk lookup                                     │
//! │  5. Load style input (reference image or previous round)     │
//! │  6. Generate, persist, return                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Misses are not coalesced. Two concurrent requests for the same missing key
//! both call the model and both write the file; each write is atomic and the
//! last rename wins. Generation happens at most once only for requests that
//! arrive after the first one has been stored.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::catalog::{Character, CharacterCatalog, SceneStore};
use crate::error::AssetError;
use crate::experience::prompts;
use crate::genai::{GeneratedImage, GenerativeModel, Part};

use super::cache::{AssetCache, CacheLayer};
use super::key::AssetKey;

/// Caption used when the scene id is not known for the character.
const DEFAULT_CAPTION: &str = "general interaction";

// =============================================================================
// Request / Response
// =============================================================================

/// Parameters of one game image round.
#[derive(Debug, Clone)]
pub struct GameImageRequest {
    pub character_id: String,
    pub scene_id: String,
    pub round: u32,
    pub previous_choices: Vec<String>,
    /// Dish description for the plate
    pub current_prompt: String,
    /// Previous round's image as raw base64 or a `data:` URL
    pub base_image_data: Option<String>,
}

/// A cached or freshly generated image.
#[derive(Debug, Clone)]
pub struct AssetResponse {
    pub data: Bytes,

    /// Whether the asset was served from either cache layer
    pub cache_hit: bool,

    /// MIME type sniffed from the bytes
    pub content_type: &'static str,

    /// Hex SHA-256 of the bytes
    pub etag: String,
}

impl AssetResponse {
    fn new(data: Bytes, cache_hit: bool) -> Self {
        Self {
            content_type: sniff_image_mime(&data),
            etag: hex::encode(Sha256::digest(&data)),
            data,
            cache_hit,
        }
    }
}

// =============================================================================
// Asset Service
// =============================================================================

/// Generates images through the model and caches them on disk.
///
/// # Type Parameters
///
/// * `M` - The generative model backend
pub struct AssetService<M: GenerativeModel> {
    model: Arc<M>,
    cache: AssetCache,
    characters: Arc<CharacterCatalog>,
    scenes: Arc<SceneStore>,
    public_dir: PathBuf,
    generation_enabled: bool,
}

impl<M: GenerativeModel> AssetService<M> {
    pub fn new(
        model: Arc<M>,
        cache: AssetCache,
        characters: Arc<CharacterCatalog>,
        scenes: Arc<SceneStore>,
        public_dir: impl AsRef<Path>,
        generation_enabled: bool,
    ) -> Self {
        Self {
            model,
            cache,
            characters,
            scenes,
            public_dir: public_dir.as_ref().to_path_buf(),
            generation_enabled,
        }
    }

    /// Whether image endpoints are served at all.
    pub fn generation_enabled(&self) -> bool {
        self.generation_enabled
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    fn ensure_enabled(&self) -> Result<(), AssetError> {
        if self.generation_enabled {
            Ok(())
        } else {
            Err(AssetError::GenerationDisabled)
        }
    }

    fn character(&self, character_id: &str) -> Result<&Character, AssetError> {
        self.characters
            .get(character_id)
            .ok_or_else(|| AssetError::CharacterNotFound(character_id.to_string()))
    }

    async fn lookup(&self, key: &AssetKey) -> Result<Option<AssetResponse>, AssetError> {
        Ok(self.cache.get(key).await?.map(|(data, layer)| {
            debug!(
                key = %key,
                layer = match layer {
                    CacheLayer::Memory => "memory",
                    CacheLayer::Disk => "disk",
                },
                "Asset cache hit"
            );
            AssetResponse::new(data, true)
        }))
    }

    /// Read the character's style reference from `public/characters/<id>.png`.
    async fn reference_image(&self, character: &Character) -> Result<Bytes, AssetError> {
        let path = character.reference_image_path(&self.public_dir);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                AssetError::ReferenceImageMissing(format!("{}.png", character.id)),
            ),
            Err(e) => Err(AssetError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Scene thumbnail for `(character_id, scene_id)`.
    pub async fn get_scene_image(
        &self,
        character_id: &str,
        scene_id: &str,
    ) -> Result<AssetResponse, AssetError> {
        self.ensure_enabled()?;
        let key = AssetKey::scene(character_id, scene_id)?;
        let character = self.character(character_id)?;

        if let Some(hit) = self.lookup(&key).await? {
            return Ok(hit);
        }

        let caption = self
            .scenes
            .find(character_id, scene_id)
            .await
            .map(|s| s.caption)
            .unwrap_or_else(|| DEFAULT_CAPTION.to_string());
        let reference = self.reference_image(character).await?;

        info!(character_id, scene_id, %caption, "Generating scene image");

        let image = self
            .model
            .generate_image(vec![
                Part::png(reference),
                Part::text(prompts::scene_image_prompt(&caption)),
            ])
            .await?;

        self.store(&key, image.data).await
    }

    /// Image for one round of the progressive game.
    pub async fn get_game_image(
        &self,
        request: &GameImageRequest,
    ) -> Result<AssetResponse, AssetError> {
        self.ensure_enabled()?;
        let key = AssetKey::game(
            &request.character_id,
            &request.scene_id,
            request.round,
            &request.previous_choices,
        )?;
        let character = self.character(&request.character_id)?;

        if let Some(hit) = self.lookup(&key).await? {
            return Ok(hit);
        }

        let input = if request.round <= 1 {
            Part::png(self.reference_image(character).await?)
        } else {
            let encoded = request
                .base_image_data
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .ok_or(AssetError::MissingBaseImage)?;
            let data = decode_base_image(encoded)?;
            Part::InlineData {
                mime_type: sniff_image_mime(&data).to_string(),
                data,
            }
        };

        let prompt = prompts::game_image_prompt(
            request.round,
            &request.current_prompt,
            &request.previous_choices,
            &character.name,
        );

        info!(
            key = %key,
            round = request.round,
            dish = %request.current_prompt,
            "Generating game image"
        );

        let image = self
            .model
            .generate_image(vec![input, Part::text(prompt)])
            .await?;

        self.store(&key, image.data).await
    }

    /// Uncached bust portrait from a free-form prompt.
    pub async fn generate_character_image(
        &self,
        prompt: &str,
    ) -> Result<GeneratedImage, AssetError> {
        self.ensure_enabled()?;
        let image = self
            .model
            .generate_image(vec![Part::text(prompts::character_portrait_prompt(prompt))])
            .await?;
        Ok(image)
    }

    /// Uncached image-to-image generation styled on the character's reference.
    pub async fn generate_styled_image(
        &self,
        character_id: &str,
        prompt: String,
    ) -> Result<GeneratedImage, AssetError> {
        self.ensure_enabled()?;
        let character = self.character(character_id)?;
        let reference = self.reference_image(character).await?;
        let image = self
            .model
            .generate_image(vec![Part::png(reference), Part::text(prompt)])
            .await?;
        Ok(image)
    }

    async fn store(&self, key: &AssetKey, data: Bytes) -> Result<AssetResponse, AssetError> {
        self.cache.put(key, data.clone()).await?;
        info!(key = %key, kb = data.len() / 1024, "Asset generated and cached");
        Ok(AssetResponse::new(data, false))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// MIME type of image bytes; PNG when unrecognised.
pub fn sniff_image_mime(data: &[u8]) -> &'static str {
    match image::guess_format(data) {
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::WebP) => "image/webp",
        Ok(image::ImageFormat::Gif) => "image/gif",
        _ => "image/png",
    }
}

/// Decode raw base64 or a `data:<mime>;base64,` URL.
pub fn decode_base_image(encoded: &str) -> Result<Bytes, AssetError> {
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| AssetError::InvalidBaseImage("malformed data URL".to_string()))?,
        None => encoded,
    };

    BASE64_STANDARD
        .decode(payload.trim())
        .map(Bytes::from)
        .map_err(|e| AssetError::InvalidBaseImage(e.to_string()))
}

/// `data:<mime>;base64,<payload>` URL for inline JSON responses.
pub fn to_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(data))
}
