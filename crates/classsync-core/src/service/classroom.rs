//! Class settings, chat rooms, and assignment records.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use classsync_types::classroom::{
    AssignmentMaster, ChatMessage, ChatSession, ChatSessionUpdate, ClassSettings,
};
use classsync_types::error::ClassroomError;

use crate::repository::{Collection, RecordRepository, SeedData};
use crate::storage::kv_store::KvStore;

/// Read and update the shared classroom documents.
///
/// New chat sessions and assignments are prepended so the newest shows
/// first; chat messages are appended in send order.
pub struct ClassroomService<K: KvStore> {
    records: Arc<RecordRepository<K>>,
    seed: SeedData,
}

impl<K: KvStore> ClassroomService<K> {
    pub fn new(records: Arc<RecordRepository<K>>) -> Self {
        Self::with_seed(records, SeedData::default())
    }

    /// Use `seed` as the fallback for settings and chat messages.
    pub fn with_seed(records: Arc<RecordRepository<K>>, seed: SeedData) -> Self {
        Self { records, seed }
    }

    pub fn settings(&self) -> Result<ClassSettings, ClassroomError> {
        Ok(self
            .records
            .load(Collection::Settings, self.seed.settings.clone())?)
    }

    pub fn save_settings(&self, settings: &ClassSettings) -> Result<(), ClassroomError> {
        self.records.save(Collection::Settings, settings)?;
        tracing::info!(class_name = %settings.class_name, "saved class settings");
        Ok(())
    }

    // --- Chat ---

    pub fn chat_sessions(&self) -> Result<Vec<ChatSession>, ClassroomError> {
        Ok(self.records.load(Collection::ChatSessions, Vec::new())?)
    }

    pub fn find_chat_session(&self, id: &str) -> Result<ChatSession, ClassroomError> {
        self.chat_sessions()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ClassroomError::ChatSessionNotFound(id.to_string()))
    }

    /// Open a new chat room. It is placed first in the list.
    pub fn create_chat_session(&self, topic: &str) -> Result<ChatSession, ClassroomError> {
        let _guard = self.records.exclusive();
        let mut sessions = self.chat_sessions()?;
        let session = ChatSession {
            id: Uuid::now_v7().to_string(),
            topic: topic.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        sessions.insert(0, session.clone());
        self.records.save(Collection::ChatSessions, &sessions)?;

        tracing::info!(chat_session_id = %session.id, "opened chat session");
        Ok(session)
    }

    pub fn update_chat_session(
        &self,
        id: &str,
        update: ChatSessionUpdate,
    ) -> Result<ChatSession, ClassroomError> {
        let _guard = self.records.exclusive();
        let mut sessions = self.chat_sessions()?;
        let session = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ClassroomError::ChatSessionNotFound(id.to_string()))?;

        if let Some(topic) = update.topic {
            session.topic = topic;
        }
        if let Some(is_active) = update.is_active {
            session.is_active = is_active;
        }
        let updated = session.clone();
        self.records.save(Collection::ChatSessions, &sessions)?;
        Ok(updated)
    }

    /// All messages, lobby and rooms alike, in send order.
    pub fn chat_messages(&self) -> Result<Vec<ChatMessage>, ClassroomError> {
        Ok(self
            .records
            .load(Collection::ChatMessages, self.seed.chat_messages.clone())?)
    }

    /// Messages of one room, or the lobby when `session_id` is `None`.
    pub fn chat_messages_for(
        &self,
        session_id: Option<&str>,
    ) -> Result<Vec<ChatMessage>, ClassroomError> {
        Ok(self
            .chat_messages()?
            .into_iter()
            .filter(|m| m.session_id.as_deref() == session_id)
            .collect())
    }

    pub fn add_chat_message(&self, message: ChatMessage) -> Result<(), ClassroomError> {
        let _guard = self.records.exclusive();
        let mut messages = self.chat_messages()?;
        messages.push(message);
        self.records.save(Collection::ChatMessages, &messages)?;
        Ok(())
    }

    // --- Assignments ---

    pub fn assignment_masters(&self) -> Result<Vec<AssignmentMaster>, ClassroomError> {
        Ok(self.records.load(Collection::AssignmentMasters, Vec::new())?)
    }

    pub fn create_assignment_master(
        &self,
        title: &str,
        deadline: NaiveDate,
    ) -> Result<AssignmentMaster, ClassroomError> {
        let _guard = self.records.exclusive();
        let mut assignments = self.assignment_masters()?;
        let assignment = AssignmentMaster {
            id: Uuid::now_v7().to_string(),
            title: title.trim().to_string(),
            deadline,
            is_active: true,
            created_at: Utc::now(),
        };
        assignments.insert(0, assignment.clone());
        self.records.save(Collection::AssignmentMasters, &assignments)?;

        tracing::info!(assignment_id = %assignment.id, %deadline, "published assignment");
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryKvStore;

    fn service() -> ClassroomService<MemoryKvStore> {
        ClassroomService::new(Arc::new(RecordRepository::new(MemoryKvStore::new())))
    }

    fn message(id: &str, session_id: Option<&str>) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            session_id: session_id.map(str::to_string),
            sender_id: "s1".to_string(),
            sender_name: "Amy Chen".to_string(),
            content: format!("message {id}"),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_settings_fall_back_to_defaults() {
        let service = service();
        assert_eq!(service.settings().unwrap(), ClassSettings::default());
    }

    #[test]
    fn test_save_settings() {
        let service = service();
        let settings = ClassSettings {
            announcement: "Quiz on Friday".to_string(),
            ..ClassSettings::default()
        };
        service.save_settings(&settings).unwrap();
        assert_eq!(service.settings().unwrap().announcement, "Quiz on Friday");
    }

    #[test]
    fn test_new_chat_session_is_first_and_active() {
        let service = service();
        service.create_chat_session("Fractions").unwrap();
        let second = service.create_chat_session("Decimals").unwrap();

        let sessions = service.chat_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0], second);
        assert!(sessions.iter().all(|s| s.is_active));
    }

    #[test]
    fn test_update_chat_session() {
        let service = service();
        let session = service.create_chat_session("Fractions").unwrap();
        let updated = service
            .update_chat_session(
                &session.id,
                ChatSessionUpdate {
                    is_active: Some(false),
                    ..ChatSessionUpdate::default()
                },
            )
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.topic, "Fractions");
        assert_eq!(service.find_chat_session(&session.id).unwrap(), updated);
    }

    #[test]
    fn test_update_unknown_chat_session() {
        let service = service();
        let err = service
            .update_chat_session("nope", ChatSessionUpdate::default())
            .unwrap_err();
        assert!(matches!(err, ClassroomError::ChatSessionNotFound(ref id) if id == "nope"));
    }

    #[test]
    fn test_chat_messages_fall_back_to_seed() {
        let service = service();
        let messages = service.chat_messages().unwrap();
        assert_eq!(messages, SeedData::default().chat_messages);
    }

    #[test]
    fn test_add_chat_message_appends() {
        let service = service();
        service.add_chat_message(message("x1", Some("room"))).unwrap();
        service.add_chat_message(message("x2", None)).unwrap();

        let messages = service.chat_messages().unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "x1", "x2"]);
    }

    #[test]
    fn test_chat_messages_for_filters_by_room() {
        let service = service();
        service.add_chat_message(message("x1", Some("room"))).unwrap();
        service.add_chat_message(message("x2", Some("other"))).unwrap();

        let room = service.chat_messages_for(Some("room")).unwrap();
        assert_eq!(room.len(), 1);
        assert_eq!(room[0].id, "x1");

        let lobby = service.chat_messages_for(None).unwrap();
        assert_eq!(lobby.len(), 2);
    }

    #[test]
    fn test_new_assignment_is_first() {
        let service = service();
        let deadline = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        service.create_assignment_master("Essay", deadline).unwrap();
        let latest = service.create_assignment_master("Poster", deadline).unwrap();

        let all = service.assignment_masters().unwrap();
        assert_eq!(all[0], latest);
        assert!(latest.is_active);
        assert_eq!(latest.deadline, deadline);
    }
}
