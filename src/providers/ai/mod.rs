//! LLM provider abstraction and the Gemini implementation.

mod gemini;
mod traits;

pub use gemini::GeminiProvider;
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, LlmResult,
    TokenUsage,
};

#[cfg(test)]
pub use traits::MockLlmProvider;
