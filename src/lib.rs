//! Benchmark LLM providers on multilingual translation.
//!
//! The crate has two halves:
//!
//! * a provider client ([`ProviderClient`], built with [`LLMBuilder`]) that
//!   speaks the OpenAI-compatible chat and completion APIs of OpenAI,
//!   Fireworks, Together or a local server, and
//! * an evaluation pipeline ([`evaluator::ParallelEvaluator`]) that
//!   translates every dataset of a [`dataset::DatasetCatalog`] in bounded
//!   batches, lower-cases predictions and references, and hands them to a
//!   [`scorer::Scorer`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use llm_bench::{
//!     evaluator::{ModelTarget, ParallelEvaluator},
//!     scorer::SacreBleuCommand,
//!     LLMBuilder,
//! };
//!
//! # async fn run() -> Result<(), llm_bench::LLMError> {
//! let client = LLMBuilder::new()
//!     .provider("together")
//!     .api_key(std::env::var("TOGETHER_API_KEY").unwrap_or_default())
//!     .build()?;
//! let reports = ParallelEvaluator::new(
//!     vec![ModelTarget::new("meta-llama/Llama-3-8b-chat-hf", Arc::new(client))],
//!     Arc::new(SacreBleuCommand::default()),
//! )
//! .limit(Some(20))
//! .evaluate_parallel()
//! .await;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod builder;
pub mod chat;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod results;
pub mod scorer;

pub use backends::ProviderClient;
pub use builder::{EndpointTable, LLMBuilder, Provider};
pub use chat::{
    ChatMessage, ChatProvider, ChatRole, CompletionProvider, LLMProvider, SamplingParams,
};
pub use error::LLMError;
