//! Voting round lifecycle.
//!
//! Two states, `Closed` and `Open`. Opening a closed session starts a new
//! round with a fresh id and start time; closing keeps both so late quota
//! reads still resolve against the last round. Opening an open session and
//! closing a closed one leave the round identity untouched.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use classsync_types::error::RepositoryError;
use classsync_types::voting::VotingSession;

use crate::repository::{Collection, RecordRepository};
use crate::storage::kv_store::KvStore;

/// Owns the persisted [`VotingSession`].
pub struct VotingSessionManager<K: KvStore> {
    records: Arc<RecordRepository<K>>,
}

impl<K: KvStore> VotingSessionManager<K> {
    pub fn new(records: Arc<RecordRepository<K>>) -> Self {
        Self { records }
    }

    /// Current session, or the closed `"init"` sentinel if none is stored.
    pub fn session(&self) -> Result<VotingSession, RepositoryError> {
        self.records
            .load(Collection::VotingSession, VotingSession::default())
    }

    /// Open or close the voting round.
    ///
    /// Only a closed→open transition assigns a new round id and start time.
    #[tracing::instrument(name = "set_voting_active", skip(self))]
    pub fn set_active(&self, is_active: bool) -> Result<VotingSession, RepositoryError> {
        let _guard = self.records.exclusive();
        let current = self.session()?;

        let next = match (current.is_active, is_active) {
            (true, true) => {
                tracing::debug!(session_id = %current.session_id, "round already open");
                return Ok(current);
            }
            (false, true) => {
                let next = VotingSession {
                    is_active: true,
                    session_id: new_round_id(),
                    last_started_at: Some(Utc::now()),
                };
                tracing::info!(
                    previous = %current.session_id,
                    session_id = %next.session_id,
                    "opened voting round"
                );
                next
            }
            (_, false) => {
                if current.is_active {
                    tracing::info!(session_id = %current.session_id, "closed voting round");
                }
                VotingSession {
                    is_active: false,
                    ..current
                }
            }
        };

        self.records.save(Collection::VotingSession, &next)?;
        Ok(next)
    }
}

/// Round ids are UUID v7: unique for the lifetime of the store and
/// sortable by opening time.
fn new_round_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryKvStore;
    use classsync_types::voting::INITIAL_SESSION_ID;

    fn manager() -> VotingSessionManager<MemoryKvStore> {
        VotingSessionManager::new(Arc::new(RecordRepository::new(MemoryKvStore::new())))
    }

    #[test]
    fn test_unpersisted_session_is_sentinel() {
        let manager = manager();
        let session = manager.session().unwrap();
        assert!(!session.is_active);
        assert_eq!(session.session_id, INITIAL_SESSION_ID);
        assert!(session.last_started_at.is_none());
        // Pure read: nothing written.
        assert!(manager.records.store().is_empty());
    }

    #[test]
    fn test_open_assigns_new_round() {
        let manager = manager();
        let opened = manager.set_active(true).unwrap();
        assert!(opened.is_active);
        assert_ne!(opened.session_id, INITIAL_SESSION_ID);
        assert!(opened.last_started_at.is_some());
        assert_eq!(manager.session().unwrap(), opened);
    }

    #[test]
    fn test_open_while_open_is_noop() {
        let manager = manager();
        let first = manager.set_active(true).unwrap();
        let second = manager.set_active(true).unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.session().unwrap(), first);
    }

    #[test]
    fn test_close_preserves_round_identity() {
        let manager = manager();
        let opened = manager.set_active(true).unwrap();
        let closed = manager.set_active(false).unwrap();
        assert!(!closed.is_active);
        assert_eq!(closed.session_id, opened.session_id);
        assert_eq!(closed.last_started_at, opened.last_started_at);
        assert_eq!(manager.session().unwrap(), closed);
    }

    #[test]
    fn test_close_while_closed_keeps_sentinel() {
        let manager = manager();
        let closed = manager.set_active(false).unwrap();
        assert_eq!(closed, VotingSession::default());
    }

    #[test]
    fn test_reopen_changes_round_id() {
        let manager = manager();
        let r1 = manager.set_active(true).unwrap();
        manager.set_active(false).unwrap();
        let r2 = manager.set_active(true).unwrap();
        assert_ne!(r1.session_id, r2.session_id);
        assert!(r2.last_started_at >= r1.last_started_at);
    }

    #[test]
    fn test_session_id_changes_exactly_on_open_transitions() {
        let manager = manager();
        let sequence = [true, true, false, false, true, false, true, true, false];
        let mut previous = manager.session().unwrap();
        let mut seen = vec![previous.session_id.clone()];

        for requested in sequence {
            let next = manager.set_active(requested).unwrap();
            let opened = requested && !previous.is_active;
            if opened {
                assert_ne!(next.session_id, previous.session_id);
                assert!(!seen.contains(&next.session_id));
                seen.push(next.session_id.clone());
            } else {
                assert_eq!(next.session_id, previous.session_id);
                assert_eq!(next.last_started_at, previous.last_started_at);
            }
            assert_eq!(next.is_active, requested);
            previous = next;
        }
        // init + three openings
        assert_eq!(seen.len(), 4);
    }
}
