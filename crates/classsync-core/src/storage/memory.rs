//! In-memory key-value store.
//!
//! Backed by a `DashMap`; nothing survives the process. Lets the services
//! run without a persistent backend.

use dashmap::DashMap;

use classsync_types::error::RepositoryError;

use super::kv_store::KvStore;

/// Volatile `KvStore` implementation.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        self.entries.remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, RepositoryError> {
        let mut keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }

    fn contains(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.entries.contains_key(key))
    }
}
