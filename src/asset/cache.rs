//! Two-layer cache for generated assets.
//!
//! The disk layer is the source of truth: one file per [`AssetKey`] under
//! `<data_dir>/<kind dir>/`, written once and never invalidated. A
//! byte-bounded in-memory LRU sits in front of it so hot assets skip the
//! filesystem.
//!
//! Disk writes go to a uniquely named temp file first and are renamed into
//! place, so readers never observe a partially written asset.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::AssetError;

use super::key::AssetKey;

/// Default memory layer capacity: 64MB
pub const DEFAULT_MEMORY_CAPACITY: usize = 64 * 1024 * 1024;

/// Maximum number of entries held in memory
const DEFAULT_MAX_ENTRIES: usize = 1_000;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// =============================================================================
// Memory Layer
// =============================================================================

/// LRU cache of asset bytes with size-based capacity.
pub struct MemoryCache {
    cache: RwLock<LruCache<AssetKey, Bytes>>,

    /// Maximum total size in bytes
    max_size: usize,

    /// Current total size in bytes
    current_size: RwLock<usize>,
}

impl MemoryCache {
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(entries)),
            max_size,
            current_size: RwLock::new(0),
        }
    }

    /// Get an asset, marking it as recently used.
    pub async fn get(&self, key: &AssetKey) -> Option<Bytes> {
        let mut cache = self.cache.write().await;
        cache.get(key).cloned()
    }

    /// Store an asset, evicting least-recently-used entries over capacity.
    ///
    /// Assets larger than the whole capacity are not stored.
    pub async fn put(&self, key: AssetKey, data: Bytes) {
        let data_size = data.len();
        if data_size > self.max_size {
            return;
        }

        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        // push hands back either the replaced value or the entry evicted
        // by the entry limit
        if let Some((_, displaced)) = cache.push(key, data) {
            *current_size = current_size.saturating_sub(displaced.len());
        }
        *current_size += data_size;

        while *current_size > self.max_size {
            if let Some((_, evicted_data)) = cache.pop_lru() {
                *current_size = current_size.saturating_sub(evicted_data.len());
            } else {
                break;
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Current total size of cached assets in bytes.
    pub async fn size(&self) -> usize {
        *self.current_size.read().await
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

// =============================================================================
// Asset Cache
// =============================================================================

/// Which layer served a cache hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLayer {
    Memory,
    Disk,
}

/// Disk-backed asset cache with an in-memory front layer.
pub struct AssetCache {
    root: PathBuf,
    memory: MemoryCache,
}

impl AssetCache {
    /// Create a cache rooted at `data_dir` with a memory layer of
    /// `memory_capacity` bytes.
    pub fn new(data_dir: impl AsRef<Path>, memory_capacity: usize) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
            memory: MemoryCache::with_capacity(memory_capacity),
        }
    }

    /// On-disk location of an asset.
    pub fn path_for(&self, key: &AssetKey) -> PathBuf {
        self.root.join(key.kind().dir_name()).join(key.file_name())
    }

    /// Look up an asset in memory, then on disk.
    ///
    /// Disk hits are promoted into the memory layer.
    pub async fn get(&self, key: &AssetKey) -> Result<Option<(Bytes, CacheLayer)>, AssetError> {
        if let Some(data) = self.memory.get(key).await {
            return Ok(Some((data, CacheLayer::Memory)));
        }

        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                let data = Bytes::from(data);
                self.memory.put(key.clone(), data.clone()).await;
                debug!(key = %key, bytes = data.len(), "Loaded asset from disk");
                Ok(Some((data, CacheLayer::Disk)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AssetError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Persist an asset to disk and memory.
    pub async fn put(&self, key: &AssetKey, data: Bytes) -> Result<(), AssetError> {
        let path = self.path_for(key);
        let dir = self.root.join(key.kind().dir_name());

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AssetError::Io(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let tmp = dir.join(format!(
            ".{}.{}-{}.tmp",
            key.file_name(),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = tokio::fs::write(&tmp, &data).await {
            return Err(AssetError::Io(format!(
                "Failed to write {}: {}",
                tmp.display(),
                e
            )));
        }

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(AssetError::Io(format!(
                "Failed to move asset into {}: {}",
                path.display(),
                e
            )));
        }

        self.memory.put(key.clone(), data).await;
        Ok(())
    }

    pub fn memory(&self) -> &MemoryCache {
        &self.memory
    }
}
