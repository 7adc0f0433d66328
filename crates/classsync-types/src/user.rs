use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Account role. Stored as `"TEACHER"` / `"STUDENT"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Teacher,
    Student,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Teacher => write!(f, "teacher"),
            UserRole::Student => write!(f, "student"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teacher" => Ok(UserRole::Teacher),
            "student" => Ok(UserRole::Student),
            other => Err(format!("invalid user role: '{other}'")),
        }
    }
}

/// A user account in the `class_sync_users` collection.
///
/// Teachers carry only the base fields. Students additionally carry a
/// [`StudentProfile`], flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    /// Plain text; credentials are not hardened in this system.
    pub password: String,
    pub role: UserRole,
    #[serde(flatten)]
    pub student: Option<StudentProfile>,
}

impl User {
    pub fn is_student(&self) -> bool {
        self.role == UserRole::Student
    }
}

/// Student-only fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    /// Class currency balance.
    pub balance: i64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub assignments: Vec<StudentAssignment>,
    /// Nickname per chat session id.
    #[serde(default)]
    pub chat_nicknames: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_result: Option<QuizResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: i64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// A student's submission for an assignment master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAssignment {
    pub assignment_id: String,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: u32,
    pub total: u32,
    pub completed_at: DateTime<Utc>,
}

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

/// Generate a fresh account id (UUID v7, time-sortable).
pub fn new_user_id() -> String {
    Uuid::now_v7().to_string()
}
