//! Content-addressed, size-bounded, LRU-evicted disk cache for sample sets

pub mod index;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::cache::index::{CacheEntry, CacheIndex};
use crate::io::configuration::{CACHE_INDEX_FILE, CACHE_PAYLOAD_EXTENSION};
use crate::io::error::{GenerationError, Result};
use crate::math::hash::combine;
use crate::pixel::Sample;
use crate::sampling::StrategyKind;
use crate::sampling::params::QualityPreset;

/// Deterministic cache key for one generation request
///
/// Derived from image dimensions and configuration only, NOT from pixel
/// content: two different images with identical dimensions and config
/// share a key. This is a deliberate speed tradeoff carried over from the
/// original design; callers needing content addressing must clear the
/// cache when the underlying image changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Derive a key from request parameters
    pub const fn derive(
        width: u32,
        height: u32,
        target_count: usize,
        preset: QualityPreset,
        strategy: StrategyKind,
    ) -> Self {
        let mut state = combine(0, width as u64);
        state = combine(state, height as u64);
        state = combine(state, target_count as u64);
        state = combine(state, preset.key_tag());
        state = combine(state, strategy.key_tag());
        Self(state)
    }

    /// Hex representation used as the index key and payload file stem
    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

/// Persistent sample cache with a byte budget and LRU eviction
///
/// All index and store mutations happen under one mutex, so concurrent
/// cache operations cannot race; the index file is the single source of
/// truth for what is on disk. Payloads are JSON-serialized sample lists,
/// one file per key.
#[derive(Debug)]
pub struct CacheManager {
    root: PathBuf,
    budget_bytes: u64,
    index: Mutex<CacheIndex>,
}

impl CacheManager {
    /// Open (or create) a cache rooted at `root` with a byte budget
    ///
    /// # Errors
    ///
    /// Returns `CacheCreationFailed` if the cache directory cannot be
    /// created.
    pub fn new(root: impl Into<PathBuf>, budget_bytes: u64) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| GenerationError::CacheCreationFailed {
            path: root.clone(),
            source: e,
        })?;

        let index = CacheIndex::load(&root.join(CACHE_INDEX_FILE));
        Ok(Self {
            root,
            budget_bytes,
            index: Mutex::new(index),
        })
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured byte budget
    pub const fn budget_bytes(&self) -> u64 {
        self.budget_bytes
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(CACHE_INDEX_FILE)
    }

    fn payload_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Fetch cached samples, updating the entry's last-access marker
    ///
    /// A payload that fails to read or deserialize is treated as missing
    /// and its entry removed, so a corrupt file degrades to a cache miss.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Sample>> {
        let hex = key.as_hex();
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);

        let file_name = index.get(&hex)?.file_name.clone();
        let bytes = match std::fs::read(self.payload_path(&file_name)) {
            Ok(bytes) => bytes,
            Err(_) => {
                index.remove(&hex);
                let _ = index.save(&self.index_path());
                return None;
            }
        };

        match serde_json::from_slice::<Vec<Sample>>(&bytes) {
            Ok(samples) => {
                index.touch(&hex);
                let _ = index.save(&self.index_path());
                Some(samples)
            }
            Err(_) => {
                index.remove(&hex);
                let _ = std::fs::remove_file(self.payload_path(&file_name));
                let _ = index.save(&self.index_path());
                None
            }
        }
    }

    /// Store samples under a key, evicting LRU entries first so the total
    /// payload size never exceeds the budget after the store completes
    ///
    /// A payload larger than the whole budget is not stored at all; the
    /// call still succeeds so generation is never failed by its cache.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the samples cannot be encoded, or
    /// a file system error if the payload or index cannot be written.
    pub fn put(&self, key: &CacheKey, samples: &[Sample]) -> Result<()> {
        let bytes = serde_json::to_vec(samples)?;
        let size = bytes.len() as u64;
        if size > self.budget_bytes {
            return Ok(());
        }

        let hex = key.as_hex();
        let file_name = format!("{hex}.{CACHE_PAYLOAD_EXTENSION}");
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);

        // Replacing an existing entry frees its bytes first
        if let Some(previous) = index.remove(&hex) {
            let _ = std::fs::remove_file(self.payload_path(&previous.file_name));
        }

        // Oldest last-access first, until the new payload fits
        while index.total_bytes() + size > self.budget_bytes {
            let Some(oldest) = index.keys_by_last_access().into_iter().next() else {
                break;
            };
            if let Some(evicted) = index.remove(&oldest) {
                let _ = std::fs::remove_file(self.payload_path(&evicted.file_name));
            }
        }

        let payload_path = self.payload_path(&file_name);
        std::fs::write(&payload_path, &bytes).map_err(|e| GenerationError::FileSystem {
            path: payload_path,
            operation: "write cache payload",
            source: e,
        })?;

        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let last_accessed = index.next_access_stamp();
        index.insert(
            hex,
            CacheEntry {
                file_name,
                size_bytes: size,
                created_at,
                last_accessed,
            },
        );
        index.save(&self.index_path())
    }

    /// Remove every entry and payload
    ///
    /// # Errors
    ///
    /// Returns a file system error if the index cannot be rewritten.
    pub fn clear(&self) -> Result<()> {
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        for entry in index.drain() {
            let _ = std::fs::remove_file(self.payload_path(&entry.file_name));
        }
        index.save(&self.index_path())
    }

    /// Total payload bytes currently tracked
    pub fn total_bytes(&self) -> u64 {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .total_bytes()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Whether a key currently resolves to an entry
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key.as_hex())
            .is_some()
    }
}
