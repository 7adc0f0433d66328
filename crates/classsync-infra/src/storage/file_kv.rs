//! File-backed key-value store.
//!
//! Implements `KvStore` from `classsync-core` with one pretty-printed JSON
//! file per key (`{root}/{key}.json`). Writes go to a temp file in the same
//! directory and are renamed into place, so a crash mid-write leaves the
//! previous value intact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use classsync_core::storage::kv_store::KvStore;
use classsync_types::error::RepositoryError;

const EXTENSION: &str = "json";

/// Directory-backed implementation of `KvStore`.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            RepositoryError::Storage(format!("failed to create {}: {e}", root.display()))
        })?;
        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, RepositoryError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }
}

/// Keys become file names, so only `[A-Za-z0-9_-]` is allowed.
fn validate_key(key: &str) -> Result<(), RepositoryError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidKey(key.to_string()))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        let path = self.path_for(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RepositoryError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RepositoryError::Serialization {
                key: key.to_string(),
                message: format!("invalid JSON value: {e}"),
            })
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let path = self.path_for(key)?;
        let json = serde_json::to_string_pretty(value).map_err(|e| RepositoryError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let storage_err = |e: std::io::Error| {
            RepositoryError::Storage(format!("failed to write {}: {e}", path.display()))
        };
        let mut tmp = NamedTempFile::new_in(&self.root).map_err(storage_err)?;
        tmp.write_all(json.as_bytes()).map_err(storage_err)?;
        tmp.as_file().sync_all().map_err(storage_err)?;
        tmp.persist(&path).map_err(|e| storage_err(e.error))?;

        tracing::trace!(key, bytes = json.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepositoryError::Storage(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    fn list_keys(&self) -> Result<Vec<String>, RepositoryError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            RepositoryError::Storage(format!("failed to list {}: {e}", self.root.display()))
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RepositoryError::Storage(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            // Skip anything that could not have been written by `set`.
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_key(stem).is_ok()
            {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn contains(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.path_for(key)?.is_file())
    }
}
