use clap::Parser;
use std::path::PathBuf;

use llm_bench::{
    config::{BenchConfig, ModelConfig},
    LLMError,
};

#[derive(Parser, Debug)]
#[command(
    name = "llm-bench",
    about = "Benchmark LLM providers on code-switched translation datasets"
)]
pub struct CliArgs {
    /// TOML file with benchmark settings; flags below override it
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// Model to benchmark as provider:model (repeatable)
    #[arg(long = "model", short = 'm', value_name = "PROVIDER:MODEL")]
    pub models: Vec<String>,
    /// Send every --model to this base URL; --model then takes a bare model name
    #[arg(long)]
    pub base_url: Option<String>,
    /// Environment variable holding the key for --base-url models
    #[arg(long)]
    pub api_key_env: Option<String>,
    /// Only use the first N sentences of every dataset
    #[arg(long, short = 'n')]
    pub num_test: Option<usize>,
    /// Requests in flight per model before waiting
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// sacrebleu executable
    #[arg(long)]
    pub scorer: Option<String>,
    #[arg(long)]
    pub list_providers: bool,
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl CliArgs {
    pub fn load_config(&self) -> Result<BenchConfig, LLMError> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::load(path)?,
            None => BenchConfig::default(),
        };
        self.apply(&mut config)?;
        Ok(config)
    }

    /// Overrides file settings with whatever was passed on the command line.
    pub fn apply(&self, config: &mut BenchConfig) -> Result<(), LLMError> {
        if !self.models.is_empty() {
            config.models = self
                .models
                .iter()
                .map(|spec| self.model_config(spec))
                .collect::<Result<_, _>>()?;
        }
        if let Some(n) = self.num_test {
            config.num_test = Some(n);
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.results_dir {
            config.results_dir = dir.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = Some(timeout);
        }
        if let Some(temperature) = self.temperature {
            config.sampling.temperature = Some(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            config.sampling.max_tokens = Some(max_tokens);
        }
        if let Some(command) = &self.scorer {
            config.scorer.command = command.clone();
        }
        Ok(())
    }

    fn model_config(&self, spec: &str) -> Result<ModelConfig, LLMError> {
        match &self.base_url {
            Some(url) => Ok(ModelConfig {
                base_url: Some(url.clone()),
                model: spec.to_string(),
                api_key_env: self.api_key_env.clone(),
                ..ModelConfig::default()
            }),
            None => Ok(ModelConfig {
                api_key_env: self.api_key_env.clone(),
                ..ModelConfig::parse(spec)?
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("llm-bench").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "-m",
            "openai:gpt-4o",
            "--model",
            "together:meta-llama/Llama-3-8b-chat-hf",
            "-n",
            "25",
            "-b",
            "4",
            "--timeout",
            "60",
        ]);
        let config = args.load_config().unwrap();
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[1].provider.as_deref(), Some("together"));
        assert_eq!(config.num_test, Some(25));
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.timeout_seconds, Some(60));
    }

    #[test]
    fn base_url_takes_bare_model_names() {
        let args = parse(&["--base-url", "http://localhost:9000/v1", "-m", "llama3:8b"]);
        let config = args.load_config().unwrap();
        assert_eq!(config.models[0].model, "llama3:8b");
        assert_eq!(config.models[0].provider, None);
        assert_eq!(
            config.models[0].base_url.as_deref(),
            Some("http://localhost:9000/v1")
        );
    }

    #[test]
    fn malformed_model_flag_is_rejected() {
        let args = parse(&["-m", "gpt-4o"]);
        assert!(args.load_config().is_err());
    }
}
