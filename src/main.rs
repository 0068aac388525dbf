//! Tagalong - backend for conversations with AI characters.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagalong::{
    asset::{AssetCache, AssetService},
    catalog::{CharacterCatalog, SceneStore, TourCatalog},
    config::{Cli, Command, InitScenesConfig, ServeConfig},
    genai::{GeminiClient, PlayHtClient},
    server::{create_router, AppState, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::InitScenes(config) => run_init_scenes(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let timeout = Duration::from_secs(config.upstream_timeout);
    let generation_enabled = config.image_generation_enabled();

    info!("Tagalong v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Data dir: {}", config.data_dir.display());
    info!("  Public dir: {}", config.public_dir.display());
    info!("  Text model: {}", config.text_model);
    info!("  Image model: {}", config.image_model);
    if generation_enabled {
        info!("  Image generation: enabled");
    } else if config.disable_image_gen {
        warn!("  Image generation: DISABLED by DISABLE_IMAGE_GEN");
    } else {
        warn!("  Image generation: DISABLED (no GOOGLE_API_KEY)");
    }
    if config.play_ai_auth_key.is_none() {
        warn!("  TTS: not configured (no PLAY_AI_AUTH_KEY)");
    }
    info!(
        "  Cache: {}MB memory, max-age {}s",
        config.cache_assets / (1024 * 1024),
        config.cache_max_age
    );

    let state = match build_state(&config, timeout, generation_enabled) {
        Ok(state) => state,
        Err(e) => {
            error!("Startup error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let router = create_router(state, build_router_config(&config));
    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/api/characters", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Wire catalogs, vendor clients and the asset service together.
fn build_state(
    config: &ServeConfig,
    timeout: Duration,
    generation_enabled: bool,
) -> Result<AppState<GeminiClient, PlayHtClient>, String> {
    let characters = Arc::new(CharacterCatalog::builtin().map_err(|e| e.to_string())?);
    let tours = Arc::new(TourCatalog::builtin().map_err(|e| e.to_string())?);
    let scenes = Arc::new(SceneStore::with_builtin(&config.data_dir).map_err(|e| e.to_string())?);

    let model = Arc::new(
        GeminiClient::new(
            config.google_api_key.clone(),
            config.text_model.clone(),
            config.image_model.clone(),
            timeout,
        )
        .map_err(|e| e.to_string())?,
    );
    let speech = Arc::new(
        PlayHtClient::new(
            config.play_ai_auth_key.clone(),
            config.tts_endpoint.clone(),
            timeout,
        )
        .map_err(|e| e.to_string())?,
    );

    let assets = AssetService::new(
        Arc::clone(&model),
        AssetCache::new(&config.data_dir, config.cache_assets),
        Arc::clone(&characters),
        Arc::clone(&scenes),
        &config.public_dir,
        generation_enabled,
    );

    Ok(AppState::new(model, speech, assets, characters, scenes, tours))
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tagalong=debug,tower_http=debug"
    } else {
        "tagalong=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_cache_max_age(config.cache_max_age);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Init Scenes Command
// =============================================================================

async fn run_init_scenes(config: InitScenesConfig) -> ExitCode {
    init_logging(config.verbose);

    let store = match SceneStore::with_builtin(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to load predefined scenes: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match store.initialize_predefined().await {
        Ok(initialized) if initialized.is_empty() => {
            println!("All scene files already exist in {}", store.dir().display());
            ExitCode::SUCCESS
        }
        Ok(initialized) => {
            for character_id in &initialized {
                println!("✓ {}", character_id);
            }
            println!();
            println!(
                "Initialized {} character(s) in {}",
                initialized.len(),
                store.dir().display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
