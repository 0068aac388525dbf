//! HTTP server layer for Tagalong.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                 /health, /api/* (JSON and images)               │
//! │                                                                 │
//! │  ┌──────────────────────────────┐  ┌─────────────────────────┐  │
//! │  │          handlers            │  │        routes           │  │
//! │  │ (requests, error mapping)    │  │ (router, CORS, tracing) │  │
//! │  └──────────────────────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    AppState, CharacterView, ErrorResponse, HealthResponse, TtsError, ASSET_CACHE_HIT_HEADER,
    DEFAULT_CACHE_MAX_AGE,
};
pub use routes::{create_router, RouterConfig};
