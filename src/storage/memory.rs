//! In-memory content store
//!
//! Used by tests and by callers that need a throwaway archive.

use crate::storage::traits::{validate_key, ContentStore, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct Entry {
    content: Vec<u8>,
    content_type: String,
}

/// Content store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Entry>>,
    puts: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns true if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of `put` calls, including overwrites
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Content type recorded for `key`
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.lock()
            .ok()
            .and_then(|entries| entries.get(key).map(|e| e.content_type.clone()))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, Entry>>> {
        self.entries.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl ContentStore for MemoryStore {
    fn exists(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        Ok(self.lock()?.contains_key(key))
    }

    fn put(&self, key: &str, content: &[u8], content_type: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.lock()?.insert(
            key.to_string(),
            Entry {
                content: content.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        validate_key(key)?;
        self.lock()?
            .get(key)
            .map(|e| e.content.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .lock()?
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
