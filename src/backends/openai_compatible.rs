//! Client for OpenAI-compatible chat and completion APIs.
//!
//! One [`ProviderClient`] talks to one base URL (OpenAI, Fireworks, Together,
//! a local server, ...). Its configuration is immutable after construction,
//! so a single client can be shared by every concurrent request of a run.

mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::{
    chat::{ChatMessage, ChatProvider, CompletionProvider, LLMProvider, SamplingParams},
    error::LLMError,
};

use types::{chat_text, completion_text, ChatCompletionRequest, TextCompletionRequest};

const CHAT_PATH: &str = "chat/completions";
const COMPLETION_PATH: &str = "completions";
const ERROR_BODY_LIMIT: usize = 2_000;

/// Endpoint configuration shared by every call made through a client.
#[derive(Debug)]
pub struct ProviderConfig {
    /// Base URL exactly as resolved by the builder.
    pub base_url: String,
    pub api_key: SecretString,
    pub timeout_seconds: Option<u64>,
}

/// Uniform client for chat-style and completion-style calls.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
/// Async calls share one connection pool; a failure only affects the call
/// that produced it.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    config: Arc<ProviderConfig>,
    client: reqwest::Client,
}

impl ProviderClient {
    /// Creates a client for `base_url` with its own connection pool.
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, LLMError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LLMError::ConfigError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url, api_key, timeout_seconds))
    }

    /// Creates a client that reuses an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout_seconds: Option<u64>,
    ) -> Self {
        Self {
            config: Arc::new(ProviderConfig {
                base_url: base_url.into(),
                api_key,
                timeout_seconds,
            }),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.base_url
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.config.timeout_seconds
    }

    /// Blocking chat completion.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`ChatProvider::generate`] there.
    pub fn generate_blocking(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &SamplingParams,
    ) -> Result<String, LLMError> {
        let body = ChatCompletionRequest {
            model,
            messages,
            params,
            stream: false,
        };
        let raw = self.post_blocking(CHAT_PATH, &body, "chat completion")?;
        chat_text(&raw)
    }

    /// Blocking raw-prompt completion. HTTP failures are raised exactly as
    /// for chat calls.
    pub fn complete_blocking(
        &self,
        prompt: &str,
        model: &str,
        params: &SamplingParams,
    ) -> Result<String, LLMError> {
        let body = TextCompletionRequest {
            model,
            prompt,
            params,
            stream: false,
        };
        let raw = self.post_blocking(COMPLETION_PATH, &body, "text completion")?;
        completion_text(&raw)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn log_request_payload<T: Serialize>(&self, label: &str, body: &T) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        if let Ok(json) = serde_json::to_string(body) {
            log::trace!("{label} request payload: {json}");
        }
    }

    async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
        context: &str,
    ) -> Result<String, LLMError> {
        self.log_request_payload(context, body);
        let mut request = self
            .client
            .post(self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(self.config.api_key.expose_secret())
            .json(body);
        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let response = request.send().await?;
        let status = response.status();
        log::debug!("{context} HTTP status: {status}");
        let text = response.text().await?;
        ensure_success(status.as_u16(), status.is_success(), text)
    }

    fn post_blocking(
        &self,
        path: &str,
        body: &impl Serialize,
        context: &str,
    ) -> Result<String, LLMError> {
        self.log_request_payload(context, body);
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| LLMError::HttpError(format!("Failed to build HTTP client: {e}")))?;

        let response = client
            .post(self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(self.config.api_key.expose_secret())
            .json(body)
            .send()?;
        let status = response.status();
        log::debug!("{context} HTTP status: {status}");
        let text = response.text()?;
        ensure_success(status.as_u16(), status.is_success(), text)
    }
}

fn ensure_success(status: u16, success: bool, body: String) -> Result<String, LLMError> {
    if success {
        return Ok(body);
    }
    let mut body = body;
    if body.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(LLMError::from_status(status, body))
}

#[async_trait]
impl ChatProvider for ProviderClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &SamplingParams,
    ) -> Result<String, LLMError> {
        let body = ChatCompletionRequest {
            model,
            messages,
            params,
            stream: false,
        };
        let raw = self.post(CHAT_PATH, &body, "chat completion").await?;
        chat_text(&raw)
    }
}

#[async_trait]
impl CompletionProvider for ProviderClient {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        params: &SamplingParams,
    ) -> Result<String, LLMError> {
        let body = TextCompletionRequest {
            model,
            prompt,
            params,
            stream: false,
        };
        let raw = self.post(COMPLETION_PATH, &body, "text completion").await?;
        completion_text(&raw)
    }
}

impl LLMProvider for ProviderClient {}
