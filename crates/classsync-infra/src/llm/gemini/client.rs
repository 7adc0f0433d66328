//! GeminiFeedbackGenerator -- concrete [`FeedbackGenerator`] for Google Gemini.
//!
//! Sends a single-turn `generateContent` request and returns the text of the
//! first candidate. The API key is wrapped in [`SecretString`] and is only
//! exposed when building the request header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use classsync_core::feedback::FeedbackGenerator;
use classsync_observe::genai_attrs::{
    GEN_AI_RESPONSE_FINISH_REASONS, GEN_AI_USAGE_INPUT_TOKENS, GEN_AI_USAGE_OUTPUT_TOKENS,
    OP_ASSIGNMENT_FEEDBACK,
};
use classsync_types::config::FeedbackConfig;
use classsync_types::error::FeedbackError;

use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};

/// Gemini REST client.
///
/// Intentionally not `Debug`; the key never appears in logs.
pub struct GeminiFeedbackGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiFeedbackGenerator {
    const TEMPERATURE: f64 = 0.7;

    /// Build a generator from the `[feedback]` config section.
    pub fn new(api_key: SecretString, config: &FeedbackConfig) -> Result<Self, FeedbackError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FeedbackError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(Self::TEMPERATURE),
                max_output_tokens: None,
            }),
        }
    }
}

/// Map a non-success HTTP status to a [`FeedbackError`].
fn status_error(status: reqwest::StatusCode, body: String) -> FeedbackError {
    match status.as_u16() {
        401 | 403 => FeedbackError::AuthenticationFailed,
        429 => FeedbackError::RateLimited,
        _ => FeedbackError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

impl FeedbackGenerator for GeminiFeedbackGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, FeedbackError> {
        let span = tracing::info_span!(
            "gen_ai.generate",
            gen_ai.operation.name = OP_ASSIGNMENT_FEEDBACK,
            gen_ai.provider.name = "gemini",
            gen_ai.request.model = %self.model,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
        );
        self.send(prompt, &span).instrument(span.clone()).await
    }
}

impl GeminiFeedbackGenerator {
    async fn send(&self, prompt: &str, span: &tracing::Span) -> Result<String, FeedbackError> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&Self::build_request(prompt))
            .send()
            .await
            .map_err(|e| FeedbackError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            FeedbackError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        if let Some(usage) = &body.usage_metadata {
            span.record(GEN_AI_USAGE_INPUT_TOKENS, usage.prompt_token_count);
            span.record(GEN_AI_USAGE_OUTPUT_TOKENS, usage.candidates_token_count);
        }
        if let Some(reason) = body.finish_reason() {
            span.record(GEN_AI_RESPONSE_FINISH_REASONS, reason);
        }

        Ok(body.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(base_url: &str) -> GeminiFeedbackGenerator {
        let config = FeedbackConfig {
            base_url: base_url.to_string(),
            ..FeedbackConfig::default()
        };
        GeminiFeedbackGenerator::new(SecretString::from("test-key".to_string()), &config).unwrap()
    }

    #[test]
    fn test_url_uses_model_and_trims_slash() {
        let generator = generator("https://example.test/v1beta/");
        assert_eq!(
            generator.url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_wraps_prompt() {
        let request = GeminiFeedbackGenerator::build_request("Review this");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Review this");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(reqwest::StatusCode::UNAUTHORIZED, String::new()),
            FeedbackError::AuthenticationFailed
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::FORBIDDEN, String::new()),
            FeedbackError::AuthenticationFailed
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new()),
            FeedbackError::RateLimited
        ));
        let err = status_error(reqwest::StatusCode::BAD_REQUEST, "bad model".to_string());
        assert!(err.to_string().contains("bad model"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_provider_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let generator = generator("http://127.0.0.1:9");
        let err = generator.generate("hi").await.unwrap_err();
        assert!(matches!(err, FeedbackError::Provider { .. }));
    }
}
