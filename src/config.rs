//! Configuration management for Tagalong.
//!
//! Settings come from command-line arguments with environment variable
//! fallbacks and sensible defaults.
//!
//! # Environment Variables
//!
//! - `TAGALONG_HOST` - Server bind address (default: 0.0.0.0)
//! - `TAGALONG_PORT` - Server port (default: 3000)
//! - `TAGALONG_DATA_DIR` - Scene files and image cache (default: data)
//! - `TAGALONG_PUBLIC_DIR` - Static assets incl. character references (default: public)
//! - `GOOGLE_API_KEY` - Gemini API key; image endpoints answer 503 without it
//! - `GEMINI_TEXT_MODEL` / `GEMINI_IMAGE_MODEL` - Model names
//! - `DISABLE_IMAGE_GEN` - Turn image generation off
//! - `PLAY_AI_AUTH_KEY` - Play.ht key for `/api/tts`
//! - `TAGALONG_TTS_ENDPOINT` - Play.ht stream endpoint
//! - `TAGALONG_UPSTREAM_TIMEOUT` - Vendor request timeout in seconds (default: 120)
//! - `TAGALONG_CACHE_ASSETS` - Memory cache for images in bytes (default: 64 MiB)
//! - `TAGALONG_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 86400)
//! - `TAGALONG_CORS_ORIGINS` - Comma-separated allowed origins

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};

use crate::asset::DEFAULT_MEMORY_CAPACITY;
use crate::genai::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TTS_ENDPOINT};
use crate::server::DEFAULT_CACHE_MAX_AGE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default public directory.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Default vendor request timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tagalong - talk to AI characters across chat, quiz, game and explore
/// experiences.
#[derive(Parser, Debug, Clone)]
#[command(name = "tagalong")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server options used when no subcommand is given.
    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// The command to run; `serve` when none was given.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeConfig),

    /// Write the predefined scene lists to the data directory.
    ///
    /// Files that already exist are left untouched.
    InitScenes(InitScenesConfig),
}

/// Options of the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "TAGALONG_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "TAGALONG_PORT")]
    pub port: u16,

    /// Directory for scene files and cached images.
    #[arg(long, default_value = DEFAULT_DATA_DIR, env = "TAGALONG_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Directory holding `characters/<id>.png` style references.
    #[arg(long, default_value = DEFAULT_PUBLIC_DIR, env = "TAGALONG_PUBLIC_DIR")]
    pub public_dir: PathBuf,

    // =========================================================================
    // Generative Model
    // =========================================================================
    /// Gemini API key. Image endpoints answer 503 without it.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Model used for chat and other text.
    #[arg(long, default_value = DEFAULT_TEXT_MODEL, env = "GEMINI_TEXT_MODEL")]
    pub text_model: String,

    /// Model used for image generation.
    #[arg(long, default_value = DEFAULT_IMAGE_MODEL, env = "GEMINI_IMAGE_MODEL")]
    pub image_model: String,

    /// Turn image generation off.
    ///
    /// Any value other than `0`, `false`, `no`, `off`, `n`, `f` or an empty
    /// string disables generation, so `DISABLE_IMAGE_GEN=1` works.
    #[arg(long, env = "DISABLE_IMAGE_GEN", value_parser = FalseyValueParser::new())]
    pub disable_image_gen: bool,

    // =========================================================================
    // Speech
    // =========================================================================
    /// Play.ht key for text-to-speech.
    #[arg(long, env = "PLAY_AI_AUTH_KEY", hide_env_values = true)]
    pub play_ai_auth_key: Option<String>,

    /// Play.ht streaming endpoint.
    #[arg(long, default_value = DEFAULT_TTS_ENDPOINT, env = "TAGALONG_TTS_ENDPOINT")]
    pub tts_endpoint: String,

    /// Timeout for model and speech requests, in seconds.
    #[arg(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS, env = "TAGALONG_UPSTREAM_TIMEOUT")]
    pub upstream_timeout: u64,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Size of the in-memory image cache in bytes.
    #[arg(long, default_value_t = DEFAULT_MEMORY_CAPACITY, env = "TAGALONG_CACHE_ASSETS")]
    pub cache_assets: usize,

    /// HTTP Cache-Control max-age for images, in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "TAGALONG_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "TAGALONG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }
        if self.public_dir.as_os_str().is_empty() {
            return Err("public_dir must not be empty".to_string());
        }
        if self.cache_assets == 0 {
            return Err("cache_assets must be greater than 0".to_string());
        }
        if self.upstream_timeout == 0 {
            return Err("upstream_timeout must be greater than 0".to_string());
        }
        if self.tts_endpoint.trim().is_empty() {
            return Err("tts_endpoint must not be empty".to_string());
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether image endpoints are served.
    pub fn image_generation_enabled(&self) -> bool {
        !self.disable_image_gen
            && self
                .google_api_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty())
    }
}

/// Options of the `init-scenes` command.
#[derive(Args, Debug, Clone)]
pub struct InitScenesConfig {
    /// Directory for scene files.
    #[arg(long, default_value = DEFAULT_DATA_DIR, env = "TAGALONG_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
