use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{
    chat::{ChatMessage, ChatProvider, SamplingParams},
    error::LLMError,
};

use super::parallel::RunStage;

/// Requests allowed in flight before the translator waits for the batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Ordered model outputs plus the size of every batch that was awaited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translations {
    /// `texts[i]` answers `prompts[i]`.
    pub texts: Vec<String>,
    pub batch_sizes: Vec<usize>,
}

impl Translations {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Number of times the translator stopped to await in-flight requests.
    pub fn await_points(&self) -> usize {
        self.batch_sizes.len()
    }
}

/// Sends one chat request per prompt to a single model, at most
/// `batch_size` at a time.
///
/// Prompts are submitted in order as independent tasks. Once `batch_size`
/// tasks are outstanding (or the last prompt is submitted) every one of them
/// is awaited before the next prompt goes out, so one slow request holds up
/// the following batch. The first failure aborts the remaining tasks of the
/// batch and is returned.
#[derive(Clone)]
pub struct BatchTranslator {
    provider: Arc<dyn ChatProvider>,
    model: String,
    params: SamplingParams,
    batch_size: usize,
}

impl BatchTranslator {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            params: SamplingParams::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sampling settings sent with every request.
    pub fn params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    /// Maximum requests in flight before waiting; must be at least 1.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub async fn translate(&self, prompts: &[String]) -> Result<Translations, LLMError> {
        if self.batch_size == 0 {
            return Err(LLMError::ConfigError(
                "batch size must be at least 1".to_string(),
            ));
        }

        let mut texts = Vec::with_capacity(prompts.len());
        let mut batch_sizes = Vec::new();

        for (batch_idx, batch) in prompts.chunks(self.batch_size).enumerate() {
            log::debug!("{}: {} batch {}", self.model, RunStage::Dispatching, batch_idx);
            let mut in_flight = self.submit(batch);
            log::debug!(
                "{}: {} {} ({} requests, {} done so far)",
                self.model,
                RunStage::AwaitingBatch,
                batch_idx,
                batch.len(),
                texts.len()
            );
            texts.extend(Self::await_batch(&mut in_flight, batch.len()).await?);
            batch_sizes.push(batch.len());
        }

        Ok(Translations { texts, batch_sizes })
    }

    fn submit(&self, batch: &[String]) -> JoinSet<(usize, Result<String, LLMError>)> {
        let mut in_flight = JoinSet::new();
        for (offset, prompt) in batch.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let model = self.model.clone();
            let params = self.params.clone();
            let messages = vec![ChatMessage::user().content(prompt.as_str()).build()];
            in_flight.spawn(async move {
                let result = provider.generate(&messages, &model, &params).await;
                (offset, result)
            });
        }
        in_flight
    }

    /// Waits for every task of a batch and restores submission order.
    /// Dropping `in_flight` on error aborts the siblings still running.
    async fn await_batch(
        in_flight: &mut JoinSet<(usize, Result<String, LLMError>)>,
        len: usize,
    ) -> Result<Vec<String>, LLMError> {
        let mut slots: Vec<Option<String>> = vec![None; len];
        while let Some(joined) = in_flight.join_next().await {
            let (offset, result) = joined.map_err(|e| LLMError::TaskError(e.to_string()))?;
            slots[offset] = Some(result?);
        }
        Ok(slots.into_iter().flatten().collect())
    }
}
