//! Class settings, chat, and assignment records.
//!
//! These are plain documents: the store keeps them verbatim and the
//! services only prepend, append, or replace whole collections.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Class-wide configuration document (`class_sync_settings`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSettings {
    pub class_name: String,
    pub teacher_name: String,
    /// Display name of the class currency shown next to student balances.
    pub currency_name: String,
    #[serde(default)]
    pub announcement: String,
}

impl Default for ClassSettings {
    fn default() -> Self {
        Self {
            class_name: "Class 7A".to_string(),
            teacher_name: "Ms. Lin".to_string(),
            currency_name: "coins".to_string(),
            announcement: String::new(),
        }
    }
}

/// A chat room opened by the teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub topic: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update for a chat session. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ChatSessionUpdate {
    pub topic: Option<String>,
    pub is_active: Option<bool>,
}

/// A chat message. Messages without a `session_id` belong to the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// An assignment published by the teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentMaster {
    pub id: String,
    pub title: String,
    pub deadline: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
