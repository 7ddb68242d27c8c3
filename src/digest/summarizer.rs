//! One-line AI digest of the day's forwarded posts.

use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Shown in the report when the summary could not be generated.
pub const SUMMARY_FALLBACK: &str = "(summary generation failed)";

const SYSTEM_PROMPT: &str = "You are a professional news digest assistant. \
     Summarize the day's content in concise language.";

/// Configuration for summary generation.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            temperature: 0.3,
            max_tokens: 256,
        }
    }
}

/// Asks the LLM for a short digest of a block of text.
pub struct Summarizer {
    llm: Arc<dyn LlmProvider>,
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmProvider>, config: SummarizerConfig) -> Self {
        Self { llm, config }
    }

    /// Summarize `text` in at most 50 words.
    ///
    /// Timeouts and empty replies are reported as errors like any other
    /// provider failure.
    pub async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt(text)),
        ])
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let response = tokio::time::timeout(self.config.timeout, self.llm.complete(request))
            .await
            .map_err(|_| LlmError::Timeout {
                provider: self.llm.model_name().to_string(),
                timeout: self.config.timeout,
            })??;

        let summary = response.content.trim();
        if summary.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: "empty summary".to_string(),
            });
        }

        tracing::debug!(
            model = self.llm.model_name(),
            chars = summary.chars().count(),
            "Generated digest summary"
        );
        Ok(summary.to_string())
    }
}

fn user_prompt(text: &str) -> String {
    format!("Write a short summary of at most 50 words for the following content:\n{text}")
}
