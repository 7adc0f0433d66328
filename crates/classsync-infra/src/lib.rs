//! Infrastructure layer for ClassSync.
//!
//! Contains implementations of the ports defined in `classsync-core`: the
//! file-backed key-value store and the Gemini feedback generator, plus data
//! directory, config file and API key resolution.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
pub mod storage;
