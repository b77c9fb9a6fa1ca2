use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, SamplingParams};
use crate::error::LLMError;

/// Request payload for the `/chat/completions` endpoint.
#[derive(Serialize, Debug)]
pub(super) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(flatten)]
    pub params: &'a SamplingParams,
    pub stream: bool,
}

/// Request payload for the raw-prompt `/completions` endpoint.
#[derive(Serialize, Debug)]
pub(super) struct TextCompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(flatten)]
    pub params: &'a SamplingParams,
    pub stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TextCompletionResponse {
    choices: Vec<TextChoice>,
}

#[derive(Deserialize, Debug)]
struct TextChoice {
    text: Option<String>,
}

fn format_error(context: &str, message: impl std::fmt::Display, raw: &str) -> LLMError {
    LLMError::ResponseFormatError {
        message: format!("{context}: {message}"),
        raw_response: raw.to_string(),
    }
}

/// Extracts `choices[0].message.content` from a chat response body.
pub(super) fn chat_text(raw: &str) -> Result<String, LLMError> {
    let context = "chat completion response";
    let parsed: ChatCompletionResponse =
        serde_json::from_str(raw).map_err(|e| format_error(context, e, raw))?;
    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| format_error(context, "no choices returned", raw))?
        .message
        .content
        .ok_or_else(|| format_error(context, "first choice has no message content", raw))
}

/// Extracts `choices[0].text` from a completion response body.
pub(super) fn completion_text(raw: &str) -> Result<String, LLMError> {
    let context = "text completion response";
    let parsed: TextCompletionResponse =
        serde_json::from_str(raw).map_err(|e| format_error(context, e, raw))?;
    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| format_error(context, "no choices returned", raw))?
        .text
        .ok_or_else(|| format_error(context, "first choice has no text", raw))
}
