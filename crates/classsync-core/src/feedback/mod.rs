//! AI feedback on student assignments.
//!
//! `FeedbackGenerator` is the port an LLM backend implements (the Gemini
//! client lives in classsync-infra). `FeedbackService` wraps an optional
//! generator and always produces a displayable string: generator failures
//! are logged and replaced with a fixed fallback message.

use classsync_types::error::FeedbackError;

/// Returned when no generator is configured (no API key).
pub const PLACEHOLDER_FEEDBACK: &str = "AI feedback is not configured. Sample feedback: \
    a solid piece of work, but try adding more of your own point of view.";

/// Returned when the generator fails.
pub const FALLBACK_FEEDBACK: &str =
    "AI feedback is temporarily unavailable. Please ask your teacher.";

/// Returned when the generator answers with nothing.
pub const EMPTY_FEEDBACK: &str = "Could not generate feedback. Please try again later.";

/// A backend that turns a prompt into feedback text.
///
/// Uses native async fn in traits (RPITIT).
pub trait FeedbackGenerator: Send + Sync {
    /// Model name, recorded on the feedback span.
    fn model(&self) -> &str;

    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, FeedbackError>> + Send;
}

/// Build the prompt for one assignment submission.
pub fn feedback_prompt(title: &str, content: &str) -> String {
    format!(
        "You are a kind and professional teacher. A student has just submitted a \
reflection assignment titled \"{title}\".

Submission:
\"{content}\"

Give the student 50-100 words of constructive feedback. Keep the tone \
encouraging and positive, and name one specific strength and one specific \
thing to improve. Reply directly in the teacher's voice, without a greeting."
    )
}

/// Assignment feedback with graceful degradation.
pub struct FeedbackService<G: FeedbackGenerator> {
    generator: Option<G>,
}

impl<G: FeedbackGenerator> FeedbackService<G> {
    pub fn new(generator: Option<G>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Feedback for a submission. Never fails.
    #[tracing::instrument(name = "assignment_feedback", skip(self, content))]
    pub async fn assignment_feedback(&self, content: &str, title: &str) -> String {
        let Some(generator) = &self.generator else {
            tracing::warn!("no feedback generator configured, returning placeholder");
            return PLACEHOLDER_FEEDBACK.to_string();
        };

        let prompt = feedback_prompt(title, content);
        match generator.generate(&prompt).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::warn!(model = generator.model(), "generator returned empty feedback");
                    EMPTY_FEEDBACK.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                tracing::error!(model = generator.model(), error = %e, "feedback generation failed");
                FALLBACK_FEEDBACK.to_string()
            }
        }
    }
}
