//! Peer voting: round lifecycle and the vote ledger.
//!
//! `VotingSessionManager` opens and closes rounds; `VoteLedger` accepts
//! votes for the open round and enforces the per-voter rules. Both share
//! one `RecordRepository` and its write guard.

pub mod ledger;
pub mod session;

pub use ledger::VoteLedger;
pub use session::VotingSessionManager;
