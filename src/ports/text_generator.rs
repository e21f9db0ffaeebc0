//! TextGenerator port - interface for the external text-generation capability.
//!
//! The core never talks to a model directly; it hands over a
//! `GenerationContext` and gets text back. Implementations may be slow and
//! may fail - callers wrap invocations in the retry policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CopingStyle, VadScore};
use crate::domain::journey::JourneyStage;

/// Everything the text capability gets to work with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    /// The diary entry being processed.
    pub diary: String,
    pub vad: VadScore,
    /// The stage the generated text is destined for.
    pub stage: JourneyStage,
    pub coping_style: CopingStyle,
    /// Prior journey context (guestbook text, earlier prompts), oldest first.
    pub history: Vec<String>,
}

impl GenerationContext {
    /// Creates a context with empty history.
    pub fn new(
        diary: impl Into<String>,
        vad: VadScore,
        stage: JourneyStage,
        coping_style: CopingStyle,
    ) -> Self {
        Self {
            diary: diary.into(),
            vad,
            stage,
            coping_style,
            history: Vec::new(),
        }
    }

    /// Appends one history line.
    pub fn with_history_line(mut self, line: impl Into<String>) -> Self {
        self.history.push(line.into());
        self
    }
}

/// Text produced by the capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub text: String,
    /// Which backend produced it, for logging and cost attribution.
    pub provider: String,
}

/// Failures the generation capabilities can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// Transient backend failure; eligible for retry.
    #[error("generation service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// The supplied context cannot produce a generation; never retried.
    #[error("invalid generation context: {reason}")]
    InvalidContext { reason: String },

    /// Network-level failure reaching the backend; eligible for retry.
    #[error("network error: {0}")]
    Network(String),

    /// The call exceeded its deadline; eligible for retry.
    #[error("generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl GenerationError {
    /// Creates a service unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an invalid context error.
    pub fn invalid_context(reason: impl Into<String>) -> Self {
        Self::InvalidContext {
            reason: reason.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Returns true if this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::ServiceUnavailable { .. }
                | GenerationError::Network(_)
                | GenerationError::Timeout { .. }
        )
    }
}

/// Port for the text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for the given context.
    async fn generate_text(
        &self,
        context: &GenerationContext,
    ) -> Result<GeneratedText, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builder_collects_history() {
        let ctx = GenerationContext::new(
            "today felt heavy",
            VadScore::new(0.2, 0.6, 0.4).unwrap(),
            JourneyStage::Reflection,
            CopingStyle::Balanced,
        )
        .with_history_line("prior prompt")
        .with_history_line("guestbook text");

        assert_eq!(ctx.history.len(), 2);
        assert_eq!(ctx.stage, JourneyStage::Reflection);
    }

    #[test]
    fn retryable_classification() {
        assert!(GenerationError::unavailable("down").is_retryable());
        assert!(GenerationError::network("reset").is_retryable());
        assert!(GenerationError::Timeout { timeout_secs: 30 }.is_retryable());
        assert!(!GenerationError::invalid_context("empty diary").is_retryable());
    }

    #[test]
    fn errors_display_with_context() {
        assert_eq!(
            GenerationError::unavailable("overloaded").to_string(),
            "generation service unavailable: overloaded"
        );
        assert_eq!(
            GenerationError::Timeout { timeout_secs: 30 }.to_string(),
            "generation timed out after 30s"
        );
    }
}
