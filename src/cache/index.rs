//! Persistent cache index: the single source of truth for on-disk payloads

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::error::Result;

/// Metadata for one cached payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Payload file name within the cache directory
    pub file_name: String,
    /// Serialized payload size in bytes
    pub size_bytes: u64,
    /// Creation time, seconds since the unix epoch
    pub created_at: u64,
    /// Last access marker, monotonic milliseconds since the unix epoch
    ///
    /// Issued by [`CacheIndex::next_access_stamp`], which never repeats a
    /// value, so LRU ordering stays total even for back-to-back accesses
    /// within the same clock tick.
    pub last_accessed: u64,
}

/// Mapping from opaque string keys to entry metadata, persisted alongside
/// the payload files
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CacheIndex {
    entries: HashMap<String, CacheEntry>,
    #[serde(skip)]
    last_stamp: u64,
}

impl CacheIndex {
    /// Load the index from disk, or start empty if no file exists
    ///
    /// A corrupt index is discarded rather than failing cache creation;
    /// orphaned payloads are unreachable and get overwritten by later
    /// stores under the same key.
    pub fn load(path: &Path) -> Self {
        let mut index: Self = std::fs::read(path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();
        index.last_stamp = index
            .entries
            .values()
            .map(|entry| entry.last_accessed)
            .max()
            .unwrap_or(0);
        index
    }

    /// Persist the index to disk
    ///
    /// # Errors
    ///
    /// Returns a serialization or file system error.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(self)?;
        std::fs::write(path, bytes).map_err(|e| crate::io::error::GenerationError::FileSystem {
            path: path.to_path_buf(),
            operation: "write cache index",
            source: e,
        })
    }

    /// Look up an entry by key
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Remove an entry, returning its metadata
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    /// Update an entry's last-access marker
    pub fn touch(&mut self, key: &str) {
        let stamp = self.next_access_stamp();
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_accessed = stamp;
        }
    }

    /// Total payload bytes tracked by the index
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|entry| entry.size_bytes).sum()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys ordered ascending by last access (LRU first)
    pub fn keys_by_last_access(&self) -> Vec<String> {
        let mut keyed: Vec<(&String, u64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key, entry.last_accessed))
            .collect();
        keyed.sort_by_key(|&(_, accessed)| accessed);
        keyed.into_iter().map(|(key, _)| key.clone()).collect()
    }

    /// Drain every entry, returning the metadata for payload removal
    pub fn drain(&mut self) -> Vec<CacheEntry> {
        self.entries.drain().map(|(_, entry)| entry).collect()
    }

    /// Issue a strictly increasing access marker
    pub fn next_access_stamp(&mut self) -> u64 {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }
}
