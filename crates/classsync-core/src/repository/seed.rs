//! Baked-in seed data written by `initialize_defaults` on first start.

use chrono::{DateTime, Utc};

use classsync_types::classroom::{ChatMessage, ClassSettings};
use classsync_types::user::{StudentProfile, User, UserRole};

/// Initial contents for the seeded collections.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub users: Vec<User>,
    pub settings: ClassSettings,
    pub chat_messages: Vec<ChatMessage>,
}

impl Default for SeedData {
    fn default() -> Self {
        let mut users = vec![default_teacher()];
        users.extend(default_students());
        Self {
            users,
            settings: ClassSettings::default(),
            chat_messages: default_chat_messages(),
        }
    }
}

fn default_teacher() -> User {
    User {
        id: "t1".to_string(),
        name: "Ms. Lin".to_string(),
        username: "teacher".to_string(),
        password: "teacher".to_string(),
        role: UserRole::Teacher,
        student: None,
    }
}

fn default_students() -> Vec<User> {
    const NAMES: [&str; 5] = ["Amy Chen", "Ben Wang", "Cathy Liu", "David Huang", "Emma Tsai"];

    NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let n = i + 1;
            User {
                id: format!("s{n}"),
                name: (*name).to_string(),
                username: format!("student{n}"),
                password: "1234".to_string(),
                role: UserRole::Student,
                student: Some(StudentProfile {
                    balance: 100,
                    ..StudentProfile::default()
                }),
            }
        })
        .collect()
}

fn default_chat_messages() -> Vec<ChatMessage> {
    // 2024-09-01T08:00:00Z, the first day of term.
    let start = DateTime::<Utc>::from_timestamp(1_725_177_600, 0).unwrap_or_default();

    vec![
        ChatMessage {
            id: "m1".to_string(),
            session_id: None,
            sender_id: "t1".to_string(),
            sender_name: "Ms. Lin".to_string(),
            content: "Welcome to class! Post questions here any time.".to_string(),
            timestamp: start,
        },
        ChatMessage {
            id: "m2".to_string(),
            session_id: None,
            sender_id: "s1".to_string(),
            sender_name: "Amy Chen".to_string(),
            content: "Thanks, Ms. Lin!".to_string(),
            timestamp: start + chrono::Duration::minutes(5),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_has_one_teacher_and_students() {
        let seed = SeedData::default();
        let teachers = seed.users.iter().filter(|u| u.role == UserRole::Teacher).count();
        let students: Vec<&User> = seed.users.iter().filter(|u| u.is_student()).collect();
        assert_eq!(teachers, 1);
        assert_eq!(students.len(), 5);
        assert!(students.iter().all(|s| s.student.is_some()));
    }

    #[test]
    fn test_seed_usernames_unique() {
        let seed = SeedData::default();
        let mut names: Vec<&str> = seed.users.iter().map(|u| u.username.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), seed.users.len());
    }

    #[test]
    fn test_seed_chat_messages_are_ordered() {
        let seed = SeedData::default();
        assert_eq!(seed.chat_messages.len(), 2);
        assert!(seed.chat_messages[0].timestamp < seed.chat_messages[1].timestamp);
    }
}
