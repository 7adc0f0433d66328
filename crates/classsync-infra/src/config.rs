//! Configuration loader for ClassSync.
//!
//! Reads `config.toml` from the data directory (`~/.classsync/` in production)
//! and deserializes it into [`ClassSyncConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::Path;

use classsync_types::config::ClassSyncConfig;

use crate::filesystem::config_path;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`ClassSyncConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> ClassSyncConfig {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return ClassSyncConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ClassSyncConfig::default();
        }
    };

    match toml::from_str::<ClassSyncConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ClassSyncConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert!(config.feedback.enabled);
        assert_eq!(config.feedback.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[feedback]
model = "gemini-2.5-pro"
timeout_secs = 15
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.feedback.model, "gemini-2.5-pro");
        assert_eq!(config.feedback.timeout_secs, 15);
        assert!(config.feedback.enabled);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.feedback.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn load_config_can_disable_feedback() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "[feedback]\nenabled = false\n")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert!(!config.feedback.enabled);
    }
}
