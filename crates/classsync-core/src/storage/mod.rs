//! Storage abstractions for ClassSync.
//!
//! Defines the key-value store trait and an in-memory implementation.
//! The file-backed implementation lives in classsync-infra.

pub mod kv_store;
pub mod memory;
