use async_trait::async_trait;

use crate::error::LLMError;

use super::message::ChatMessage;
use super::params::SamplingParams;

/// Trait for providers that support chat-style interactions.
///
/// Implementations must be safe to call concurrently from many tasks: one
/// call's failure never affects another in-flight call.
#[async_trait]
pub trait ChatProvider: Sync + Send {
    /// Sends `messages` to `model` and returns the text of the first choice.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &SamplingParams,
    ) -> Result<String, LLMError>;
}

/// Trait for providers that support raw-prompt completion.
#[async_trait]
pub trait CompletionProvider: Sync + Send {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        params: &SamplingParams,
    ) -> Result<String, LLMError>;
}

/// Core trait that every benchmarked backend implements.
pub trait LLMProvider: ChatProvider + CompletionProvider {}
