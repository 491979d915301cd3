//! LLM provider trait and supporting types.
//!
//! The application only needs single-turn completions: one prompt in, one
//! text reply out, called once per email (classification) and once per
//! privacy page (contact extraction).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    Authentication(String),
}

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// A single-turn completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Optional system instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// The user prompt.
    pub prompt: String,

    /// Sampling temperature (lower is more deterministic).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

fn default_temperature() -> f32 {
    0.2
}

impl CompletionRequest {
    /// Creates a request for the given prompt with extraction-friendly
    /// defaults (low temperature, no token cap).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            prompt: prompt.into(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: usize,
    /// Tokens in the completion.
    pub completion_tokens: usize,
    /// Total tokens used.
    pub total_tokens: usize,
}

/// Reason why a completion finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of generation.
    Stop,
    /// Hit the max_tokens limit.
    Length,
    /// Content was filtered for safety.
    Safety,
    /// Unknown or provider-specific reason.
    #[serde(other)]
    Other,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text.
    pub text: String,
    /// Token usage statistics.
    pub tokens_used: TokenUsage,
    /// Why generation finished.
    pub finish_reason: FinishReason,
}

/// Trait for LLM providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider's name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Returns the model identifier being used.
    fn model(&self) -> &str;

    /// Performs a completion request and returns the full response.
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_builder() {
        let request = CompletionRequest::new("Classify this email")
            .with_system_prompt("You extract structured data")
            .with_temperature(0.0)
            .with_max_tokens(256);

        assert_eq!(request.prompt, "Classify this email");
        assert_eq!(
            request.system_prompt,
            Some("You extract structured data".to_string())
        );
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, Some(256));
    }

    #[test]
    fn completion_request_defaults_to_low_temperature() {
        let request = CompletionRequest::new("prompt");
        assert!(request.temperature < 0.5);
        assert!(request.max_tokens.is_none());
    }

    #[test]
    fn finish_reason_deserialization() {
        let stop: FinishReason = serde_json::from_str("\"stop\"").unwrap();
        assert_eq!(stop, FinishReason::Stop);

        // Unknown reasons map to Other rather than failing.
        let unknown: FinishReason = serde_json::from_str("\"recitation\"").unwrap();
        assert_eq!(unknown, FinishReason::Other);
    }

    #[test]
    fn completion_response_serialization() {
        let response = CompletionResponse {
            text: "{\"company\": \"Spotify\"}".to_string(),
            tokens_used: TokenUsage {
                prompt_tokens: 120,
                completion_tokens: 15,
                total_tokens: 135,
            },
            finish_reason: FinishReason::Stop,
        };

        let json = serde_json::to_string(&response).unwrap();
        let parsed: CompletionResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.text, response.text);
        assert_eq!(parsed.tokens_used.total_tokens, 135);
    }
}
