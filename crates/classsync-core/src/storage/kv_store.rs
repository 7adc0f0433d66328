//! Key-value store trait.
//!
//! Defines the interface for the process-local document store.
//! Implementations live in this crate (`MemoryKvStore`) and in
//! classsync-infra (`FileKvStore`).

use classsync_types::error::RepositoryError;

/// Trait for string-keyed persistent storage of JSON documents.
///
/// Calls are synchronous and complete immediately or fail. A `set` fully
/// replaces the previous value; there are no partial updates.
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError>;

    /// Set a value for a key (upsert).
    fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError>;

    /// Remove a key. No-op if the key does not exist.
    fn remove(&self, key: &str) -> Result<(), RepositoryError>;

    /// List all keys in ascending order.
    fn list_keys(&self) -> Result<Vec<String>, RepositoryError>;

    /// Whether a key currently holds a value.
    fn contains(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<K: KvStore + ?Sized> KvStore for std::sync::Arc<K> {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        (**self).remove(key)
    }

    fn list_keys(&self) -> Result<Vec<String>, RepositoryError> {
        (**self).list_keys()
    }

    fn contains(&self, key: &str) -> Result<bool, RepositoryError> {
        (**self).contains(key)
    }
}
