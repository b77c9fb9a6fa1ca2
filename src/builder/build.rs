use secrecy::{ExposeSecret, SecretString};

use crate::{backends::ProviderClient, error::LLMError};

use super::llm_builder::LLMBuilder;
use super::state::BuilderState;

impl LLMBuilder {
    pub fn build(self) -> Result<ProviderClient, LLMError> {
        self.state.build()
    }
}

impl BuilderState {
    fn log_state(&self) {
        log::debug!(
            "Building provider client. provider={:?} base_url={:?} api_key_set={} timeout={:?}",
            self.provider,
            self.base_url,
            self.api_key
                .as_ref()
                .map(|k| !k.expose_secret().is_empty())
                .unwrap_or(false),
            self.timeout_seconds,
        );
    }

    fn resolve_endpoint(&mut self) -> Result<String, LLMError> {
        if let Some(url) = self.base_url.take() {
            return Ok(url);
        }
        let name = self.provider.take().ok_or_else(|| {
            LLMError::ConfigError("Either a base URL or a provider must be given".to_string())
        })?;
        let table = self.endpoints.take().unwrap_or_default();
        table.resolve(&name).map(str::to_string)
    }

    pub(super) fn build(mut self) -> Result<ProviderClient, LLMError> {
        self.log_state();
        let endpoint = self.resolve_endpoint()?;
        // A missing key is not rejected here; the backend answers 401/403.
        let api_key = self
            .api_key
            .take()
            .unwrap_or_else(|| SecretString::new(String::new()));
        ProviderClient::new(endpoint, api_key, self.timeout_seconds)
    }
}
