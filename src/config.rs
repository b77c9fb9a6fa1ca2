//! Benchmark settings loaded from a TOML file.
//!
//! ```toml
//! batch_size = 10
//! num_test = 100
//!
//! [sampling]
//! temperature = 0.0
//!
//! [[models]]
//! provider = "fireworks"
//! model = "accounts/fireworks/models/llama-v3-70b-instruct"
//!
//! [[models]]
//! base_url = "http://localhost:8000/v1"
//! model = "my-local-model"
//!
//! [api_keys]
//! fireworks = "fw-..."
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    backends::ProviderClient,
    builder::{EndpointTable, LLMBuilder},
    chat::SamplingParams,
    dataset::DatasetCatalog,
    error::LLMError,
    evaluator::DEFAULT_BATCH_SIZE,
    scorer::SacreBleuCommand,
};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_RESULTS_DIR: &str = "results";
const DEFAULT_SCORER_COMMAND: &str = "sacrebleu";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub batch_size: usize,
    /// Only the first `num_test` sentences of every dataset are used; 0 means all.
    pub num_test: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub sampling: SamplingParams,
    pub models: Vec<ModelConfig>,
    /// Provider name → API key.
    pub api_keys: BTreeMap<String, SecretString>,
    /// Replaces the built-in dataset catalog when present.
    pub datasets: Option<DatasetCatalog>,
    /// Extra or overriding provider name → base URL entries.
    pub endpoints: BTreeMap<String, String>,
    pub scorer: ScorerConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            batch_size: DEFAULT_BATCH_SIZE,
            num_test: None,
            timeout_seconds: None,
            sampling: SamplingParams::default(),
            models: Vec::new(),
            api_keys: BTreeMap::new(),
            datasets: None,
            endpoints: BTreeMap::new(),
            scorer: ScorerConfig::default(),
        }
    }
}

/// One model to benchmark. Either `provider` or `base_url` selects the
/// endpoint; `base_url` wins when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    /// Environment variable holding this model's API key.
    pub api_key_env: Option<String>,
}

impl ModelConfig {
    /// Parses `provider:model`. Only the first `:` separates, so model tags
    /// like `llama3:8b` survive.
    pub fn parse(spec: &str) -> Result<Self, LLMError> {
        let (provider, model) = spec.split_once(':').ok_or_else(|| {
            LLMError::ConfigError(format!("expected provider:model, got '{spec}'"))
        })?;
        if provider.is_empty() || model.is_empty() {
            return Err(LLMError::ConfigError(format!(
                "expected provider:model, got '{spec}'"
            )));
        }
        Ok(Self {
            provider: Some(provider.to_string()),
            model: model.to_string(),
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub command: String,
    /// Appended after the built-in `-m bleu -f json`.
    pub args: Vec<String>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_SCORER_COMMAND.to_string(),
            args: Vec::new(),
        }
    }
}

impl ScorerConfig {
    pub fn command(&self) -> SacreBleuCommand {
        self.args
            .iter()
            .fold(SacreBleuCommand::new(&self.command), |cmd, arg| cmd.arg(arg))
    }
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self, LLMError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| LLMError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&contents)
            .map_err(|e| LLMError::ConfigError(format!("{}: {e}", path.display())))?;
        log::debug!(
            "Loaded config from {} ({} models)",
            path.display(),
            config.models.len()
        );
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, LLMError> {
        toml::from_str(contents).map_err(|e| LLMError::ConfigError(e.to_string()))
    }

    /// Checks settings that would otherwise only fail mid-run.
    pub fn validate(&self) -> Result<(), LLMError> {
        if self.batch_size == 0 {
            return Err(LLMError::ConfigError(
                "batch_size must be at least 1".to_string(),
            ));
        }
        for model in &self.models {
            if model.model.is_empty() {
                return Err(LLMError::ConfigError("model name is empty".to_string()));
            }
            if model.provider.is_none() && model.base_url.is_none() {
                return Err(LLMError::ConfigError(format!(
                    "model '{}' needs a provider or a base_url",
                    model.model
                )));
            }
        }
        Ok(())
    }

    pub fn catalog(&self) -> DatasetCatalog {
        self.datasets.clone().unwrap_or_default()
    }

    /// Built-in endpoints with the configured entries merged on top.
    pub fn endpoint_table(&self) -> EndpointTable {
        self.endpoints
            .iter()
            .fold(EndpointTable::default(), |table, (name, url)| {
                table.with_endpoint(name.as_str(), url.as_str())
            })
    }

    /// Looks the key up in `api_key_env`, then `api_keys[provider]`, then
    /// `<PROVIDER>_API_KEY`.
    pub fn api_key_for(&self, model: &ModelConfig) -> Option<SecretString> {
        if let Some(value) = model.api_key_env.as_deref().and_then(non_empty_env) {
            return Some(SecretString::new(value));
        }
        let provider = model.provider.as_deref()?;
        let listed = self
            .api_keys
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(provider));
        if let Some((_, key)) = listed {
            return Some(SecretString::new(key.expose_secret().clone()));
        }
        non_empty_env(&conventional_env_var(provider)).map(SecretString::new)
    }

    /// Builds the client serving `model`. A missing key is sent as an empty
    /// bearer token.
    pub fn client_for(&self, model: &ModelConfig) -> Result<ProviderClient, LLMError> {
        let mut builder = LLMBuilder::new().endpoints(self.endpoint_table());
        if let Some(provider) = &model.provider {
            builder = builder.provider(provider.as_str());
        }
        if let Some(url) = &model.base_url {
            builder = builder.base_url(url.as_str());
        }
        match self.api_key_for(model) {
            Some(key) => builder = builder.api_key(key.expose_secret().as_str()),
            None => log::warn!("No API key found for {}", model.model),
        }
        if let Some(timeout) = self.timeout_seconds {
            builder = builder.timeout_seconds(timeout);
        }
        builder.build()
    }
}

fn conventional_env_var(provider: &str) -> String {
    let name: String = provider
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{name}_API_KEY")
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_apply_to_empty_file() {
        let config = BenchConfig::from_toml("").unwrap();
        assert_eq!(config.data_dir, Path::new("data"));
        assert_eq!(config.results_dir, Path::new("results"));
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.num_test, None);
        assert_eq!(config.timeout_seconds, None);
        assert!(config.sampling.is_unset());
        assert_eq!(config.catalog(), DatasetCatalog::flores());
        assert_eq!(config.scorer.command, "sacrebleu");
        config.validate().unwrap();
    }

    #[test]
    fn full_file_parses() {
        let config = BenchConfig::from_toml(
            r#"
            batch_size = 4
            num_test = 50
            timeout_seconds = 30

            [sampling]
            temperature = 0.0
            max_tokens = 256

            [[models]]
            provider = "together"
            model = "meta-llama/Llama-3-8b-chat-hf"

            [[models]]
            base_url = "http://gpu-box:9000/v1"
            model = "local"
            api_key_env = "GPU_BOX_KEY"

            [api_keys]
            together = "tg-secret"

            [endpoints]
            groq = "https://api.groq.com/openai/v1"

            [[datasets]]
            id = "wmt/de-en"
            source = { label = "German", file = "de" }
            target = { label = "English", file = "en" }

            [scorer]
            command = "/opt/bin/sacrebleu"
            args = ["--tokenize", "13a"]
            "#,
        )
        .unwrap();

        config.validate().unwrap();
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.sampling.max_tokens, Some(256));
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[1].api_key_env.as_deref(), Some("GPU_BOX_KEY"));
        assert_eq!(config.catalog().len(), 1);
        assert_eq!(
            config.endpoint_table().resolve("groq").unwrap(),
            "https://api.groq.com/openai/v1"
        );
        assert_eq!(
            config.endpoint_table().resolve("openai").unwrap(),
            "https://api.openai.com/v1"
        );
        assert_eq!(config.scorer.args, ["--tokenize", "13a"]);
    }

    #[test]
    fn malformed_file_is_config_error() {
        assert!(matches!(
            BenchConfig::from_toml("batch_size = \"ten\""),
            Err(LLMError::ConfigError(_))
        ));
    }

    #[rstest]
    #[case("batch_size = 0")]
    #[case("[[models]]\nmodel = \"orphan\"")]
    #[case("[[models]]\nprovider = \"openai\"")]
    fn invalid_settings_are_rejected(#[case] toml: &str) {
        let config = BenchConfig::from_toml(toml).unwrap();
        assert!(matches!(config.validate(), Err(LLMError::ConfigError(_))));
    }

    #[rstest]
    #[case("openai:gpt-4o", "openai", "gpt-4o")]
    #[case(
        "fireworks:accounts/fireworks/models/mixtral-8x7b",
        "fireworks",
        "accounts/fireworks/models/mixtral-8x7b"
    )]
    #[case("localhost:llama3:8b", "localhost", "llama3:8b")]
    fn model_spec_parses(#[case] spec: &str, #[case] provider: &str, #[case] model: &str) {
        let parsed = ModelConfig::parse(spec).unwrap();
        assert_eq!(parsed.provider.as_deref(), Some(provider));
        assert_eq!(parsed.model, model);
    }

    #[rstest]
    #[case("gpt-4o")]
    #[case(":gpt-4o")]
    #[case("openai:")]
    fn bad_model_spec_is_rejected(#[case] spec: &str) {
        assert!(matches!(
            ModelConfig::parse(spec),
            Err(LLMError::ConfigError(_))
        ));
    }

    #[test]
    fn key_resolution_order() {
        std::env::set_var("LLM_BENCH_CFG_TEST_MODEL_KEY", "from-model-env");
        std::env::set_var("CFGTEST_PROVIDER_API_KEY", "from-conventional-env");
        let config = BenchConfig::from_toml(
            r#"
            [api_keys]
            Listed = "from-file"
            "#,
        )
        .unwrap();

        let with_env = ModelConfig {
            provider: Some("listed".into()),
            model: "m".into(),
            api_key_env: Some("LLM_BENCH_CFG_TEST_MODEL_KEY".into()),
            ..ModelConfig::default()
        };
        let listed = ModelConfig {
            api_key_env: None,
            ..with_env.clone()
        };
        let conventional = ModelConfig::parse("cfgtest-provider:m").unwrap();
        let missing = ModelConfig::parse("nobody-configured-this:m").unwrap();

        let key = |m: &ModelConfig| config.api_key_for(m).map(|k| k.expose_secret().clone());
        assert_eq!(key(&with_env).as_deref(), Some("from-model-env"));
        assert_eq!(key(&listed).as_deref(), Some("from-file"));
        assert_eq!(key(&conventional).as_deref(), Some("from-conventional-env"));
        assert_eq!(key(&missing), None);
    }

    #[test]
    fn client_uses_configured_endpoint_and_timeout() {
        let config = BenchConfig::from_toml(
            r#"
            timeout_seconds = 5
            [endpoints]
            together = "http://127.0.0.1:1/v1"
            "#,
        )
        .unwrap();

        let client = config
            .client_for(&ModelConfig::parse("together:m").unwrap())
            .unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1/v1");
        assert_eq!(client.timeout_seconds(), Some(5));

        let direct = config
            .client_for(&ModelConfig {
                base_url: Some("http://10.0.0.2/v1".into()),
                model: "m".into(),
                ..ModelConfig::default()
            })
            .unwrap();
        assert_eq!(direct.endpoint(), "http://10.0.0.2/v1");
    }

    #[test]
    fn unknown_provider_fails_to_build() {
        let config = BenchConfig::default();
        let err = config
            .client_for(&ModelConfig::parse("mystery:m").unwrap())
            .unwrap_err();
        assert!(matches!(err, LLMError::ConfigError(_)));
    }
}
