//! Voting round and vote records.
//!
//! A [`VotingSession`] identifies the current (or most recent) round; a
//! [`Vote`] copies that round's id by value at cast time, so votes from a
//! closed round stay in the ledger but no longer count toward any quota.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Round id of the voting session before it has ever been opened.
pub const INITIAL_SESSION_ID: &str = "init";

/// Maximum number of votes a single voter may cast within one round.
pub const VOTES_PER_ROUND: usize = 3;

/// The voting round state persisted under `class_sync_voting_session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingSession {
    /// Whether the round currently accepts votes.
    pub is_active: bool,
    /// Opaque round id; changes only when a closed session is opened.
    pub session_id: String,
    /// When the current `session_id` was opened. Stored as `""` until the
    /// first activation.
    #[serde(default, with = "empty_as_none")]
    pub last_started_at: Option<DateTime<Utc>>,
}

impl Default for VotingSession {
    fn default() -> Self {
        Self {
            is_active: false,
            session_id: INITIAL_SESSION_ID.to_string(),
            last_started_at: None,
        }
    }
}

/// A single cast vote. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub voter_id: String,
    pub target_id: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Number of votes a target received within one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyEntry {
    pub target_id: String,
    pub votes: usize,
}

mod empty_as_none {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_is_closed_sentinel() {
        let session = VotingSession::default();
        assert!(!session.is_active);
        assert_eq!(session.session_id, "init");
        assert!(session.last_started_at.is_none());
    }

    #[test]
    fn test_session_serializes_unset_start_as_empty_string() {
        let json = serde_json::to_value(VotingSession::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"isActive": false, "sessionId": "init", "lastStartedAt": ""})
        );
    }

    #[test]
    fn test_session_parses_stored_document() {
        let session: VotingSession = serde_json::from_str(
            r#"{"isActive":true,"sessionId":"1718000000000","lastStartedAt":"2024-06-10T06:13:20.000Z"}"#,
        )
        .unwrap();
        assert!(session.is_active);
        assert_eq!(session.session_id, "1718000000000");
        assert_eq!(
            session.last_started_at.unwrap().to_rfc3339(),
            "2024-06-10T06:13:20+00:00"
        );
    }

    #[test]
    fn test_session_missing_start_defaults_to_none() {
        let session: VotingSession =
            serde_json::from_str(r#"{"isActive":false,"sessionId":"init"}"#).unwrap();
        assert!(session.last_started_at.is_none());
    }

    #[test]
    fn test_session_rejects_garbage_timestamp() {
        let result: Result<VotingSession, _> = serde_json::from_str(
            r#"{"isActive":false,"sessionId":"init","lastStartedAt":"yesterday"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_vote_uses_camel_case_fields() {
        let vote = Vote {
            voter_id: "s1".to_string(),
            target_id: "s2".to_string(),
            session_id: "r1".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&vote).unwrap();
        assert!(json.contains("\"voterId\":\"s1\""));
        assert!(json.contains("\"targetId\":\"s2\""));
        assert!(json.contains("\"sessionId\":\"r1\""));
    }
}
