use secrecy::SecretString;

use super::{
    backend::{EndpointTable, Provider},
    state::BuilderState,
};

/// Builder for configuring and instantiating a [`crate::ProviderClient`].
///
/// Exactly one of [`LLMBuilder::provider`] or [`LLMBuilder::base_url`] must
/// end up set; when both are given the explicit URL wins.
pub struct LLMBuilder {
    pub(super) state: BuilderState,
}

impl Default for LLMBuilder {
    fn default() -> Self {
        Self {
            state: BuilderState::new(),
        }
    }
}

impl LLMBuilder {
    /// Creates a new empty builder instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a provider by name, resolved through the endpoint table.
    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.state.provider = Some(name.into());
        self
    }

    /// Selects one of the built-in providers.
    pub fn backend(self, provider: Provider) -> Self {
        self.provider(provider.name())
    }

    /// Sets the base URL for API requests, used verbatim.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.state.base_url = Some(url.into());
        self
    }

    /// Sets the API key sent as a bearer token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.state.api_key = Some(SecretString::new(key.into()));
        self
    }

    /// Replaces the provider → URL table (defaults to the built-in one).
    pub fn endpoints(mut self, table: EndpointTable) -> Self {
        self.state.endpoints = Some(table);
        self
    }

    /// Bounds each request; no timeout is applied when unset.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.state.timeout_seconds = Some(timeout_seconds);
        self
    }
}
