//! API key lookup from the environment.
//!
//! The key is wrapped in [`SecretString`] as soon as it is read and is
//! never logged.

use secrecy::SecretString;

/// Environment variables checked for the Gemini API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// First non-empty API key found in [`API_KEY_VARS`].
pub fn resolve_api_key() -> Option<SecretString> {
    resolve_api_key_with(|name| std::env::var(name).ok())
}

fn resolve_api_key_with<F>(lookup: F) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS.iter().find_map(|name| {
        let value = lookup(name)?;
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            tracing::debug!(source = name, "resolved API key");
            Some(SecretString::from(value.to_string()))
        }
    })
}
