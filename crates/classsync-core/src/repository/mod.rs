//! Typed record repository over the key-value store.
//!
//! Every collection lives under one fixed key as a single JSON document.
//! Reads fall back to a caller-supplied default without writing it back;
//! only [`RecordRepository::initialize_defaults`] seeds the store.

pub mod seed;

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use classsync_types::classroom::{AssignmentMaster, ChatSession};
use classsync_types::error::RepositoryError;
use classsync_types::voting::{Vote, VotingSession};

use crate::storage::kv_store::KvStore;

pub use seed::SeedData;

/// The named collections persisted by ClassSync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    CurrentUser,
    Settings,
    ChatMessages,
    ChatSessions,
    AssignmentMasters,
    VotingSession,
    Votes,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Users,
        Collection::CurrentUser,
        Collection::Settings,
        Collection::ChatMessages,
        Collection::ChatSessions,
        Collection::AssignmentMasters,
        Collection::VotingSession,
        Collection::Votes,
    ];

    /// The store key holding this collection.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Users => "class_sync_users",
            Collection::CurrentUser => "class_sync_current_user",
            Collection::Settings => "class_sync_settings",
            Collection::ChatMessages => "class_sync_chat_msgs",
            Collection::ChatSessions => "class_sync_chat_sessions",
            Collection::AssignmentMasters => "class_sync_assignment_masters",
            Collection::VotingSession => "class_sync_voting_session",
            Collection::Votes => "class_sync_votes",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Load/save access to the ClassSync collections.
///
/// Also owns the write guard that serializes read-modify-write sequences
/// (casting a vote, toggling the round, registering an account). The guard
/// is not reentrant: take it once per public operation.
pub struct RecordRepository<K: KvStore> {
    store: K,
    write_lock: Mutex<()>,
}

impl<K: KvStore> RecordRepository<K> {
    pub fn new(store: K) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Hold this guard across a read-modify-write sequence.
    pub fn exclusive(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deserialize the collection, or return `default` if nothing is stored.
    ///
    /// The default is not persisted.
    pub fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
        default: T,
    ) -> Result<T, RepositoryError> {
        Ok(self.load_optional(collection)?.unwrap_or(default))
    }

    /// Deserialize the collection if present.
    pub fn load_optional<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Option<T>, RepositoryError> {
        let Some(value) = self.store.get(collection.key())? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RepositoryError::Serialization {
                key: collection.key().to_string(),
                message: e.to_string(),
            })
    }

    /// Serialize and persist, fully replacing the previous value.
    pub fn save<T: Serialize>(&self, collection: Collection, value: &T) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(value).map_err(|e| RepositoryError::Serialization {
            key: collection.key().to_string(),
            message: e.to_string(),
        })?;
        self.store.set(collection.key(), &value)
    }

    pub fn remove(&self, collection: Collection) -> Result<(), RepositoryError> {
        self.store.remove(collection.key())
    }

    /// Write seed data into every collection that has no value yet.
    ///
    /// Idempotent: collections that already hold data are never touched.
    /// Returns the collections that were seeded by this call. The current
    /// user pointer is never seeded.
    #[tracing::instrument(name = "initialize_defaults", skip_all)]
    pub fn initialize_defaults(&self, seed: &SeedData) -> Result<Vec<Collection>, RepositoryError> {
        let _guard = self.exclusive();
        let mut seeded = Vec::new();

        let mut seed_if_absent = |collection: Collection,
                                  value: serde_json::Value|
         -> Result<(), RepositoryError> {
            if !self.store.contains(collection.key())? {
                self.store.set(collection.key(), &value)?;
                seeded.push(collection);
            }
            Ok(())
        };

        seed_if_absent(Collection::Users, to_value(Collection::Users, &seed.users)?)?;
        seed_if_absent(Collection::Settings, to_value(Collection::Settings, &seed.settings)?)?;
        seed_if_absent(
            Collection::ChatMessages,
            to_value(Collection::ChatMessages, &seed.chat_messages)?,
        )?;
        seed_if_absent(
            Collection::ChatSessions,
            to_value(Collection::ChatSessions, &Vec::<ChatSession>::new())?,
        )?;
        seed_if_absent(
            Collection::AssignmentMasters,
            to_value(Collection::AssignmentMasters, &Vec::<AssignmentMaster>::new())?,
        )?;
        seed_if_absent(
            Collection::VotingSession,
            to_value(Collection::VotingSession, &VotingSession::default())?,
        )?;
        seed_if_absent(Collection::Votes, to_value(Collection::Votes, &Vec::<Vote>::new())?)?;

        if seeded.is_empty() {
            tracing::debug!("store already initialized");
        } else {
            tracing::info!(count = seeded.len(), "seeded default collections");
        }
        Ok(seeded)
    }
}

fn to_value<T: Serialize>(collection: Collection, value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value).map_err(|e| RepositoryError::Serialization {
        key: collection.key().to_string(),
        message: e.to_string(),
    })
}
