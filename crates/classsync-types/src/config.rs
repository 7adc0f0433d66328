//! Global configuration types for ClassSync.
//!
//! `ClassSyncConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default so an empty or missing file works.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassSyncConfig {
    /// AI assignment feedback settings.
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

/// Settings for the AI feedback generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Set to false to always return the placeholder feedback.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP timeout for a single generation request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
