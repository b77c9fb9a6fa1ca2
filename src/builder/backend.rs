use std::collections::BTreeMap;

use crate::error::LLMError;

/// Hosted or local services with a built-in endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Fireworks,
    Together,
    Localhost,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::OpenAI,
        Provider::Fireworks,
        Provider::Together,
        Provider::Localhost,
    ];

    /// Name used in configuration files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Fireworks => "fireworks",
            Provider::Together => "together",
            Provider::Localhost => "localhost",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Fireworks => "https://api.fireworks.ai/inference/v1",
            Provider::Together => "https://api.together.xyz/v1",
            Provider::Localhost => "http://localhost:8000/v1",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Provider {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "fireworks" => Ok(Provider::Fireworks),
            "together" => Ok(Provider::Together),
            "localhost" => Ok(Provider::Localhost),
            _ => Err(LLMError::ConfigError(format!("Unknown provider: {s}"))),
        }
    }
}

/// Immutable provider name → base URL mapping handed to the client builder.
///
/// `EndpointTable::default()` holds the built-in providers; extra or
/// overriding entries are layered on with [`EndpointTable::with_endpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTable {
    entries: BTreeMap<String, String>,
}

impl Default for EndpointTable {
    fn default() -> Self {
        let entries = Provider::ALL
            .iter()
            .map(|p| (p.name().to_string(), p.default_base_url().to_string()))
            .collect();
        Self { entries }
    }
}

impl EndpointTable {
    /// A table with no entries at all.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with_endpoint(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.entries.insert(name.into().to_lowercase(), url.into());
        self
    }

    /// Looks up the base URL for `name`, failing for names not in the table.
    pub fn resolve(&self, name: &str) -> Result<&str, LLMError> {
        self.entries
            .get(&name.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| LLMError::ConfigError(format!("Unknown provider: {name}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
