//! Generated-asset cache and generation service.
//!
//! Images are generated once and then served from disk forever:
//!
//! ```text
//! request ──► AssetKey ──► MemoryCache ──► data/<kind>/<file>.png ──► model
//!                              ▲                 │ (promote)            │
//!                              └─────────────────┴──── persist ◄────────┘
//! ```
//!
//! - [`AssetKey`]: deterministic, filesystem-safe file name
//! - [`AssetCache`]: byte-bounded LRU over the write-once disk directory
//! - [`AssetService`]: gating, lookup, style input loading and generation

mod cache;
mod key;
mod service;

pub use cache::{AssetCache, CacheLayer, MemoryCache, DEFAULT_MEMORY_CAPACITY};
pub use key::{AssetKey, AssetKind};
pub use service::{
    decode_base_image, sniff_image_mime, to_data_url, AssetResponse, AssetService,
    GameImageRequest,
};
