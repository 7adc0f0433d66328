//! Business logic and storage ports for ClassSync.
//!
//! This crate defines the `KvStore` port that the infrastructure layer
//! implements, the typed `RecordRepository` built on top of it, and the
//! services: voting rounds, the vote ledger, accounts, classroom records
//! and AI feedback. It depends only on `classsync-types` -- never on
//! `classsync-infra` or any filesystem/HTTP crate.

pub mod feedback;
pub mod repository;
pub mod service;
pub mod storage;
pub mod voting;
