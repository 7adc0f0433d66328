//! Append-only vote ledger.
//!
//! Each voter may cast at most [`VOTES_PER_ROUND`] votes per round, each for
//! a different target. Quotas are scoped by round id, so opening a new round
//! resets every voter without touching older records.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use classsync_types::error::{RepositoryError, VoteError};
use classsync_types::voting::{TallyEntry, VOTES_PER_ROUND, Vote};

use crate::repository::{Collection, RecordRepository};
use crate::storage::kv_store::KvStore;

use super::session::VotingSessionManager;

/// The vote ledger, consulting the session manager for the active round.
pub struct VoteLedger<K: KvStore> {
    records: Arc<RecordRepository<K>>,
    sessions: Arc<VotingSessionManager<K>>,
}

impl<K: KvStore> VoteLedger<K> {
    pub fn new(records: Arc<RecordRepository<K>>, sessions: Arc<VotingSessionManager<K>>) -> Self {
        Self { records, sessions }
    }

    /// All votes across all rounds, in cast order.
    pub fn votes(&self) -> Result<Vec<Vote>, RepositoryError> {
        self.records.load(Collection::Votes, Vec::new())
    }

    /// Votes belonging to one round.
    pub fn votes_in_round(&self, session_id: &str) -> Result<Vec<Vote>, RepositoryError> {
        Ok(self
            .votes()?
            .into_iter()
            .filter(|v| v.session_id == session_id)
            .collect())
    }

    /// Cast a vote in the active round.
    ///
    /// Checks run in a fixed order so the caller sees the most relevant
    /// reason: closed round, then exhausted quota, then repeated target.
    /// Self-votes are accepted.
    #[tracing::instrument(name = "cast_vote", skip(self))]
    pub fn cast_vote(&self, voter_id: &str, target_id: &str) -> Result<Vote, VoteError> {
        let _guard = self.records.exclusive();

        let session = self.sessions.session()?;
        if !session.is_active {
            tracing::debug!("rejected: voting closed");
            return Err(VoteError::VotingClosed);
        }

        let mut votes = self.votes()?;
        let mine: Vec<&Vote> = votes
            .iter()
            .filter(|v| v.voter_id == voter_id && v.session_id == session.session_id)
            .collect();

        if mine.len() >= VOTES_PER_ROUND {
            tracing::debug!(cast = mine.len(), "rejected: quota exhausted");
            return Err(VoteError::QuotaExceeded {
                limit: VOTES_PER_ROUND,
            });
        }
        if mine.iter().any(|v| v.target_id == target_id) {
            tracing::debug!("rejected: duplicate target");
            return Err(VoteError::DuplicateTarget {
                target_id: target_id.to_string(),
            });
        }

        let vote = Vote {
            voter_id: voter_id.to_string(),
            target_id: target_id.to_string(),
            session_id: session.session_id,
            timestamp: Utc::now(),
        };
        votes.push(vote.clone());
        self.records.save(Collection::Votes, &votes)?;

        tracing::info!(session_id = %vote.session_id, "vote recorded");
        Ok(vote)
    }

    /// Votes the voter may still cast in the active round. Zero when closed.
    pub fn remaining_votes(&self, voter_id: &str) -> Result<usize, RepositoryError> {
        let session = self.sessions.session()?;
        if !session.is_active {
            return Ok(0);
        }
        let used = self
            .votes()?
            .iter()
            .filter(|v| v.voter_id == voter_id && v.session_id == session.session_id)
            .count();
        Ok(VOTES_PER_ROUND.saturating_sub(used))
    }

    /// Votes received per target in one round, most votes first.
    /// Ties are ordered by target id.
    pub fn tally(&self, session_id: &str) -> Result<Vec<TallyEntry>, RepositoryError> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for vote in self.votes_in_round(session_id)? {
            *counts.entry(vote.target_id).or_insert(0) += 1;
        }

        let mut tally: Vec<TallyEntry> = counts
            .into_iter()
            .map(|(target_id, votes)| TallyEntry { target_id, votes })
            .collect();
        // Stable sort keeps the BTreeMap's id order among equal counts.
        tally.sort_by(|a, b| b.votes.cmp(&a.votes));
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SeedData;
    use crate::storage::memory::MemoryKvStore;

    struct Fixture {
        sessions: Arc<VotingSessionManager<MemoryKvStore>>,
        ledger: VoteLedger<MemoryKvStore>,
    }

    fn fixture() -> Fixture {
        let records = Arc::new(RecordRepository::new(MemoryKvStore::new()));
        records.initialize_defaults(&SeedData::default()).unwrap();
        let sessions = Arc::new(VotingSessionManager::new(records.clone()));
        let ledger = VoteLedger::new(records, sessions.clone());
        Fixture { sessions, ledger }
    }

    #[test]
    fn test_closed_session_rejects_and_leaves_ledger_unchanged() {
        let f = fixture();
        let err = f.ledger.cast_vote("s1", "s2").unwrap_err();
        assert!(matches!(err, VoteError::VotingClosed));
        assert!(f.ledger.votes().unwrap().is_empty());
    }

    #[test]
    fn test_quota_of_three_per_round() {
        let f = fixture();
        let round = f.sessions.set_active(true).unwrap();

        for target in ["s2", "s3", "s4"] {
            let vote = f.ledger.cast_vote("s1", target).unwrap();
            assert_eq!(vote.session_id, round.session_id);
        }
        let err = f.ledger.cast_vote("s1", "s5").unwrap_err();
        assert!(matches!(err, VoteError::QuotaExceeded { limit: 3 }));
        assert_eq!(f.ledger.votes().unwrap().len(), 3);
    }

    #[test]
    fn test_quota_checked_before_duplicate() {
        let f = fixture();
        f.sessions.set_active(true).unwrap();
        for target in ["s2", "s3", "s4"] {
            f.ledger.cast_vote("s1", target).unwrap();
        }
        // s2 is both a repeat and over quota; quota wins.
        let err = f.ledger.cast_vote("s1", "s2").unwrap_err();
        assert!(matches!(err, VoteError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let f = fixture();
        f.sessions.set_active(true).unwrap();
        f.ledger.cast_vote("s1", "s2").unwrap();
        let err = f.ledger.cast_vote("s1", "s2").unwrap_err();
        assert!(matches!(err, VoteError::DuplicateTarget { ref target_id } if target_id == "s2"));
        assert_eq!(f.ledger.votes().unwrap().len(), 1);
    }

    #[test]
    fn test_closed_checked_before_quota() {
        let f = fixture();
        f.sessions.set_active(true).unwrap();
        for target in ["s2", "s3", "s4"] {
            f.ledger.cast_vote("s1", target).unwrap();
        }
        f.sessions.set_active(false).unwrap();
        let err = f.ledger.cast_vote("s1", "s5").unwrap_err();
        assert!(matches!(err, VoteError::VotingClosed));
    }

    #[test]
    fn test_new_round_resets_quota_and_duplicates() {
        let f = fixture();
        let r1 = f.sessions.set_active(true).unwrap();
        for target in ["s2", "s3", "s4"] {
            f.ledger.cast_vote("s1", target).unwrap();
        }
        f.sessions.set_active(false).unwrap();
        let r2 = f.sessions.set_active(true).unwrap();
        assert_ne!(r1.session_id, r2.session_id);

        let vote = f.ledger.cast_vote("s1", "s2").unwrap();
        assert_eq!(vote.session_id, r2.session_id);

        // History across rounds is retained.
        let all = f.ledger.votes().unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(f.ledger.votes_in_round(&r1.session_id).unwrap().len(), 3);
        assert_eq!(f.ledger.votes_in_round(&r2.session_id).unwrap().len(), 1);
    }

    #[test]
    fn test_quota_is_per_voter() {
        let f = fixture();
        f.sessions.set_active(true).unwrap();
        for target in ["s2", "s3", "s4"] {
            f.ledger.cast_vote("s1", target).unwrap();
        }
        f.ledger.cast_vote("s2", "s3").unwrap();
        f.ledger.cast_vote("s3", "s2").unwrap();
        assert_eq!(f.ledger.votes().unwrap().len(), 5);
    }

    #[test]
    fn test_self_vote_is_accepted() {
        let f = fixture();
        f.sessions.set_active(true).unwrap();
        let vote = f.ledger.cast_vote("s1", "s1").unwrap();
        assert_eq!(vote.voter_id, vote.target_id);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let f = fixture();
        f.sessions.set_active(true).unwrap();
        f.ledger.cast_vote("s3", "s1").unwrap();
        f.ledger.cast_vote("s1", "s2").unwrap();
        f.ledger.cast_vote("s2", "s3").unwrap();
        let voters: Vec<String> = f.ledger.votes().unwrap().into_iter().map(|v| v.voter_id).collect();
        assert_eq!(voters, vec!["s3", "s1", "s2"]);
    }

    #[test]
    fn test_remaining_votes() {
        let f = fixture();
        assert_eq!(f.ledger.remaining_votes("s1").unwrap(), 0);
        f.sessions.set_active(true).unwrap();
        assert_eq!(f.ledger.remaining_votes("s1").unwrap(), 3);
        f.ledger.cast_vote("s1", "s2").unwrap();
        assert_eq!(f.ledger.remaining_votes("s1").unwrap(), 2);
        f.sessions.set_active(false).unwrap();
        assert_eq!(f.ledger.remaining_votes("s1").unwrap(), 0);
    }

    #[test]
    fn test_tally_orders_by_count_then_id() {
        let f = fixture();
        let round = f.sessions.set_active(true).unwrap();
        f.ledger.cast_vote("s1", "s3").unwrap();
        f.ledger.cast_vote("s2", "s3").unwrap();
        f.ledger.cast_vote("s1", "s5").unwrap();
        f.ledger.cast_vote("s2", "s4").unwrap();

        let tally = f.ledger.tally(&round.session_id).unwrap();
        let flat: Vec<(&str, usize)> = tally.iter().map(|t| (t.target_id.as_str(), t.votes)).collect();
        assert_eq!(flat, vec![("s3", 2), ("s4", 1), ("s5", 1)]);
    }

    #[test]
    fn test_tally_ignores_other_rounds() {
        let f = fixture();
        f.sessions.set_active(true).unwrap();
        f.ledger.cast_vote("s1", "s2").unwrap();
        f.sessions.set_active(false).unwrap();
        let r2 = f.sessions.set_active(true).unwrap();
        assert!(f.ledger.tally(&r2.session_id).unwrap().is_empty());
    }

    #[test]
    fn test_unseeded_ledger_reads_as_empty() {
        let records = Arc::new(RecordRepository::new(MemoryKvStore::new()));
        let sessions = Arc::new(VotingSessionManager::new(records.clone()));
        let ledger = VoteLedger::new(records, sessions);
        assert!(ledger.votes().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_casts_never_exceed_quota() {
        let f = fixture();
        f.sessions.set_active(true).unwrap();
        let ledger = Arc::new(f.ledger);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || ledger.cast_vote("s1", &format!("t{i}")).is_ok())
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(accepted, VOTES_PER_ROUND);
        assert_eq!(ledger.votes().unwrap().len(), VOTES_PER_ROUND);
    }
}
