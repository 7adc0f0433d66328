//! Shared domain types for ClassSync.
//!
//! This crate contains the records persisted by the ClassSync store:
//! users, class settings, chat, assignments, voting rounds and votes,
//! plus configuration and error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod classroom;
pub mod config;
pub mod error;
pub mod user;
pub mod voting;
