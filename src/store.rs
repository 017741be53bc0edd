//! Cache Stores
//!
//! Versioned, named mappings from request identity to stored response
//! snapshots, and the storage that owns every store for the origin.
//!
//! Only GET requests are ever inserted, so the request identity reduces to
//! the URL itself. Writes to the same key are last-writer-wins: entries are
//! idempotent snapshots, so no read-modify-write locking is needed.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::fetch::Response;

/// A stored response snapshot
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The response as it was fetched
    response: Response,
    /// When the snapshot was stored (epoch milliseconds)
    stored_at: u64,
}

impl Snapshot {
    fn new(response: Response, stored_at: u64) -> Self {
        Self {
            response,
            stored_at,
        }
    }

    /// Get the stored response
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// When the snapshot was stored (epoch milliseconds)
    pub fn stored_at(&self) -> u64 {
        self.stored_at
    }

    /// Size of the stored body in bytes
    pub fn size(&self) -> usize {
        self.response.body.as_ref().map(|b| b.len()).unwrap_or(0)
    }
}

/// A single versioned cache store.
#[derive(Debug)]
pub struct CacheStore {
    /// Version-stamped store name
    name: String,
    /// Snapshots keyed by URL
    entries: BTreeMap<String, Snapshot>,
    /// Total body bytes held
    total_size: usize,
}

impl CacheStore {
    /// Create a new, empty store
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
            total_size: 0,
        }
    }

    /// Get the store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a snapshot by URL
    pub fn lookup(&self, url: &str) -> Option<&Snapshot> {
        self.entries.get(url)
    }

    /// Store a snapshot, replacing any previous entry for the URL
    pub fn put(&mut self, url: impl Into<String>, response: Response, now_ms: u64) {
        let entry = Snapshot::new(response, now_ms);
        let size = entry.size();
        if let Some(old) = self.entries.insert(url.into(), entry) {
            self.total_size -= old.size();
        }
        self.total_size += size;
    }

    /// Delete a snapshot; returns whether one was present
    pub fn delete(&mut self, url: &str) -> bool {
        match self.entries.remove(url) {
            Some(old) => {
                self.total_size -= old.size();
                true
            }
            None => false,
        }
    }

    /// Get all cached URLs
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total body bytes held
    pub fn size(&self) -> usize {
        self.total_size
    }
}

/// All cache stores for the origin.
///
/// An explicitly owned handle passed into the policy; there is no ambient
/// global. Eviction is a full-generation sweep keyed by store name, never
/// per-entry.
#[derive(Debug)]
pub struct CacheStorage {
    /// Stores by name
    stores: BTreeMap<String, CacheStore>,
}

impl CacheStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self {
            stores: BTreeMap::new(),
        }
    }

    /// Open a store, creating it if missing
    pub fn open(&mut self, name: &str) -> &mut CacheStore {
        self.stores
            .entry(name.to_string())
            .or_insert_with(|| CacheStore::new(name))
    }

    /// Get a store without creating it
    pub fn get(&self, name: &str) -> Option<&CacheStore> {
        self.stores.get(name)
    }

    /// Commit a fully-built store, replacing any store of the same name
    pub fn insert(&mut self, store: CacheStore) {
        self.stores.insert(store.name().to_string(), store);
    }

    /// Check if a store exists
    pub fn has(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Delete a store wholesale; returns whether it existed
    pub fn delete(&mut self, name: &str) -> bool {
        self.stores.remove(name).is_some()
    }

    /// Get all store names
    pub fn names(&self) -> Vec<String> {
        self.stores.keys().cloned().collect()
    }

    /// Total body bytes held across all stores
    pub fn usage(&self) -> usize {
        self.stores.values().map(|s| s.size()).sum()
    }
}

impl Default for CacheStorage {
    fn default() -> Self {
        Self::new()
    }
}
