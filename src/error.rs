use thiserror::Error;

/// Errors from the generative model and speech vendors
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Credentials or endpoint missing from configuration
    #[error("Upstream not configured: {0}")]
    NotConfigured(String),

    /// Network or connection error
    #[error("Request failed: {0}")]
    Request(String),

    /// Vendor answered with a non-success status
    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid upstream response: {0}")]
    Decode(String),

    /// Response decoded but carried no text
    #[error("Upstream returned no text")]
    EmptyText,

    /// Response decoded but carried no image part
    #[error("No image data returned from model")]
    NoImage,

    /// Speech vendor returned a zero-length body
    #[error("Received empty audio response")]
    EmptyAudio,
}

/// Errors reading or writing the scene store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// A stored or embedded document could not be parsed
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Character id is not in the catalog
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    /// Scene id is not among the character's scenes
    #[error("Scene not found: {scene_id} (character {character_id})")]
    SceneNotFound {
        character_id: String,
        scene_id: String,
    },

    /// New scene failed validation
    #[error("Invalid scene: {0}")]
    InvalidScene(String),
}

/// Errors from the generated-asset cache and its generation path
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    /// Image generation is switched off or has no API key
    #[error("image generation disabled")]
    GenerationDisabled,

    /// Character id is not in the catalog
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    /// Cache key component would escape the cache directory
    #[error("Invalid cache key component: {0}")]
    InvalidKey(String),

    /// The character's style reference image is not on disk
    #[error("Character image not found: {0}")]
    ReferenceImageMissing(String),

    /// Progressive rounds need the previous round's image
    #[error("No base image data provided")]
    MissingBaseImage,

    /// Base image was not valid base64
    #[error("Invalid base image data: {0}")]
    InvalidBaseImage(String),

    /// Disk cache error
    #[error("Asset cache I/O error: {0}")]
    Io(String),

    /// Scene lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generation call failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Request-level errors surfaced by the HTTP handlers
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Missing or malformed request parameters
    #[error("{0}")]
    BadRequest(String),

    /// Character id is not in the catalog
    #[error("character not found: {0}")]
    CharacterNotFound(String),

    /// Scene id is not among the character's scenes
    #[error("scene not found: {0}")]
    SceneNotFound(String),

    /// No tour for this character and tour id
    #[error("Tour not found: {0}")]
    TourNotFound(String),

    /// No stop with this id in the tour
    #[error("Stop not found: {0}")]
    StopNotFound(String),

    /// Depth outside 0..=2 or deeper level absent
    #[error("Invalid depth {0} or deeper content not available")]
    InvalidDepth(u8),

    /// Scene store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Asset cache or generation failure
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Vendor failure with no fallback
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
