mod message;
mod params;
mod traits;

pub use message::{ChatMessage, ChatMessageBuilder, ChatRole};
pub use params::SamplingParams;
pub use traits::{ChatProvider, CompletionProvider, LLMProvider};
