use thiserror::Error;

/// Errors from the key-value store and the record repository.
///
/// The store is assumed reliable; any failure here is fatal to the
/// operation that triggered it.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("failed to (de)serialize '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("invalid store key: '{0}'")]
    InvalidKey(String),
}

/// Errors raised when casting a vote.
///
/// Variants are checked in declaration order: a closed round wins over an
/// exhausted quota, which wins over a repeated target.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("voting is currently closed")]
    VotingClosed,

    #[error("you have already cast all {limit} votes in this round")]
    QuotaExceeded { limit: usize },

    #[error("you have already voted for '{target_id}' in this round")]
    DuplicateTarget { target_id: String },

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Errors related to account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("account '{0}' already exists")]
    DuplicateAccount(String),

    #[error("invalid account name: {0}")]
    InvalidAccount(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Errors related to settings, chat and assignment records.
#[derive(Debug, Error)]
pub enum ClassroomError {
    #[error("chat session not found: {0}")]
    ChatSessionNotFound(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Errors from an AI feedback generator.
///
/// These never reach callers of the feedback service; they are logged and
/// replaced with a fallback message.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback generator is not configured")]
    NotConfigured,

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),
}
