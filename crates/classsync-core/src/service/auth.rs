//! Account service: login, registration, and student record upkeep.
//!
//! Credentials are compared in plain text. The "current user" is a copy of
//! the logged-in account kept under its own key; any update to that account
//! refreshes the copy.

use std::sync::Arc;

use chrono::Utc;

use classsync_types::error::AuthError;
use classsync_types::user::{
    QuizResult, RegisterRequest, StudentAssignment, StudentProfile, User, UserRole, new_user_id,
};

use crate::repository::{Collection, RecordRepository};
use crate::storage::kv_store::KvStore;

/// Login/register/logout gateway over the users collection.
pub struct AuthGateway<K: KvStore> {
    records: Arc<RecordRepository<K>>,
}

impl<K: KvStore> AuthGateway<K> {
    pub fn new(records: Arc<RecordRepository<K>>) -> Self {
        Self { records }
    }

    /// All accounts, teachers and students.
    pub fn users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.records.load(Collection::Users, Vec::new())?)
    }

    /// Look up an account by exact username and password.
    ///
    /// On success the account becomes the current user.
    #[tracing::instrument(name = "login", skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<Option<User>, AuthError> {
        let user = self
            .users()?
            .into_iter()
            .find(|u| u.username == username && u.password == password);

        match &user {
            Some(user) => {
                self.records.save(Collection::CurrentUser, user)?;
                tracing::info!(user_id = %user.id, "logged in");
            }
            None => tracing::debug!("no matching account"),
        }
        Ok(user)
    }

    /// Create an account and make it the current user.
    ///
    /// Students start with a zero balance and empty records. Fails with
    /// `DuplicateAccount` if the username is taken; the users collection is
    /// left untouched in that case.
    #[tracing::instrument(
        name = "register",
        skip(self, request),
        fields(username = %request.username, role = %request.role)
    )]
    pub fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        if request.username.trim().is_empty() {
            return Err(AuthError::InvalidAccount(
                "username cannot be empty".to_string(),
            ));
        }

        let _guard = self.records.exclusive();
        let mut users = self.users()?;
        if users.iter().any(|u| u.username == request.username) {
            return Err(AuthError::DuplicateAccount(request.username));
        }

        let student = match request.role {
            UserRole::Student => Some(StudentProfile::default()),
            UserRole::Teacher => None,
        };
        let user = User {
            id: new_user_id(),
            name: request.name.trim().to_string(),
            username: request.username,
            password: request.password,
            role: request.role,
            student,
        };

        users.push(user.clone());
        self.records.save(Collection::Users, &users)?;
        self.records.save(Collection::CurrentUser, &user)?;

        tracing::info!(user_id = %user.id, "registered account");
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.records.remove(Collection::CurrentUser)?;
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.records.load_optional(Collection::CurrentUser)?)
    }

    /// Accounts with the student role, in stored order.
    pub fn students(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users()?.into_iter().filter(User::is_student).collect())
    }

    pub fn find_user(&self, user_id: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users()?.into_iter().find(|u| u.id == user_id))
    }

    /// Replace a stored account by id. Unknown ids are ignored.
    ///
    /// Returns whether a record was replaced.
    pub fn update_student(&self, student: User) -> Result<bool, AuthError> {
        let _guard = self.records.exclusive();
        self.replace_user(student)
    }

    /// Remember the nickname a student uses in one chat session.
    pub fn save_student_nickname(
        &self,
        student_id: &str,
        chat_session_id: &str,
        nickname: &str,
    ) -> Result<bool, AuthError> {
        self.modify_student(student_id, |profile| {
            profile
                .chat_nicknames
                .insert(chat_session_id.to_string(), nickname.to_string());
        })
    }

    pub fn submit_quiz_result(&self, student_id: &str, result: QuizResult) -> Result<bool, AuthError> {
        self.modify_student(student_id, |profile| profile.quiz_result = Some(result))
    }

    /// Store a submission, replacing any earlier one for the same assignment.
    /// Earlier feedback is discarded along with it.
    pub fn submit_assignment(
        &self,
        student_id: &str,
        assignment_id: &str,
        content: &str,
    ) -> Result<bool, AuthError> {
        self.modify_student(student_id, |profile| {
            profile.assignments.retain(|a| a.assignment_id != assignment_id);
            profile.assignments.push(StudentAssignment {
                assignment_id: assignment_id.to_string(),
                content: content.to_string(),
                submitted_at: Utc::now(),
                feedback: None,
            });
        })
    }

    /// Attach feedback text to a student's submission.
    pub fn record_feedback(
        &self,
        student_id: &str,
        assignment_id: &str,
        feedback: &str,
    ) -> Result<bool, AuthError> {
        self.modify_student(student_id, |profile| {
            if let Some(submission) = profile
                .assignments
                .iter_mut()
                .find(|a| a.assignment_id == assignment_id)
            {
                submission.feedback = Some(feedback.to_string());
            }
        })
    }

    /// Apply `edit` to a student's profile and persist.
    ///
    /// Unknown ids and non-student accounts are ignored (returns false).
    fn modify_student<F>(&self, student_id: &str, edit: F) -> Result<bool, AuthError>
    where
        F: FnOnce(&mut StudentProfile),
    {
        let _guard = self.records.exclusive();
        let Some(mut student) = self.find_user(student_id)? else {
            tracing::debug!(student_id, "unknown student");
            return Ok(false);
        };
        if !student.is_student() {
            tracing::debug!(student_id, "account is not a student");
            return Ok(false);
        }

        edit(student.student.get_or_insert_with(StudentProfile::default));
        self.replace_user(student)
    }

    /// Caller must hold the write guard.
    fn replace_user(&self, user: User) -> Result<bool, AuthError> {
        let mut users = self.users()?;
        let Some(slot) = users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(false);
        };
        *slot = user.clone();
        self.records.save(Collection::Users, &users)?;

        if self
            .current_user()?
            .is_some_and(|current| current.id == user.id)
        {
            self.records.save(Collection::CurrentUser, &user)?;
        }
        Ok(true)
    }
}
