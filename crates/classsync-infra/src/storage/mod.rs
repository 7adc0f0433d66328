//! Persistent key-value store backends.

pub mod file_kv;

pub use file_kv::FileKvStore;
