//! Data directory layout for ClassSync.
//!
//! ```text
//! {data_dir}/
//!   config.toml
//!   store/
//!     class_sync_users.json
//!     ...
//! ```

use std::path::{Path, PathBuf};

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CLASSSYNC_DATA_DIR` environment variable
/// 2. `~/.classsync`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CLASSSYNC_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".classsync");
    }

    // Last resort: current directory
    PathBuf::from(".classsync")
}

/// Directory holding one JSON file per store key.
pub fn store_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("store")
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let data_dir = PathBuf::from("/home/user/.classsync");
        assert_eq!(store_dir(&data_dir), PathBuf::from("/home/user/.classsync/store"));
        assert_eq!(
            config_path(&data_dir),
            PathBuf::from("/home/user/.classsync/config.toml")
        );
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is the only one touching CLASSSYNC_DATA_DIR and
        // restores it immediately.
        unsafe {
            std::env::set_var("CLASSSYNC_DATA_DIR", "/tmp/test-classsync");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-classsync"));
        unsafe {
            std::env::remove_var("CLASSSYNC_DATA_DIR");
        }
    }
}
