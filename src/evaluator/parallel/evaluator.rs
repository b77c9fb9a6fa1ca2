use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::{
    chat::{ChatProvider, SamplingParams},
    dataset::{Dataset, DatasetCatalog, DatasetSpec},
    error::LLMError,
    scorer::{Score, Scorer},
};

use super::super::batch::{BatchTranslator, DEFAULT_BATCH_SIZE};
use super::super::prompt::PromptTemplate;
use super::types::{ModelReport, RunStage, ScoreRecord};

/// A model identifier and the provider that serves it.
#[derive(Clone)]
pub struct ModelTarget {
    pub model: String,
    pub provider: Arc<dyn ChatProvider>,
}

impl ModelTarget {
    pub fn new(model: impl Into<String>, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            model: model.into(),
            provider,
        }
    }
}

struct Settings {
    catalog: DatasetCatalog,
    data_dir: PathBuf,
    limit: Option<usize>,
    batch_size: usize,
    params: SamplingParams,
    template: PromptTemplate,
    scorer: Arc<dyn Scorer>,
}

/// Runs every model's dataset sweep as its own task and collects one
/// report per model.
///
/// Within a sweep datasets are processed one after another; a failure aborts
/// that model's sweep only.
pub struct ParallelEvaluator {
    targets: Vec<ModelTarget>,
    settings: Settings,
    include_timing: bool,
}

impl ParallelEvaluator {
    /// Creates an evaluator over `targets` using the built-in dataset catalog.
    pub fn new(targets: Vec<ModelTarget>, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            targets,
            settings: Settings {
                catalog: DatasetCatalog::default(),
                data_dir: PathBuf::from("data"),
                limit: None,
                batch_size: DEFAULT_BATCH_SIZE,
                params: SamplingParams::default(),
                template: PromptTemplate::default(),
                scorer,
            },
            include_timing: true,
        }
    }

    /// Replaces the built-in dataset catalog.
    pub fn catalog(mut self, catalog: DatasetCatalog) -> Self {
        self.settings.catalog = catalog;
        self
    }

    /// Sets the directory dataset files are read from.
    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.settings.data_dir = data_dir.into();
        self
    }

    /// Only translate the first `limit` sentences of every dataset.
    /// `Some(0)` means no limit.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.settings.limit = limit;
        self
    }

    /// Sets how many requests each model keeps in flight.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.settings.batch_size = batch_size;
        self
    }

    /// Sets the sampling settings sent with every request.
    pub fn params(mut self, params: SamplingParams) -> Self {
        self.settings.params = params;
        self
    }

    /// Sets the prompt each sentence is wrapped in.
    pub fn template(mut self, template: PromptTemplate) -> Self {
        self.settings.template = template;
        self
    }

    /// Sets whether to include timing information in reports.
    pub fn include_timing(mut self, include: bool) -> Self {
        self.include_timing = include;
        self
    }

    /// Runs all model sweeps concurrently and waits for every one of them.
    ///
    /// Reports come back in the order the targets were given.
    pub async fn evaluate_parallel(self) -> Vec<ModelReport> {
        let settings = Arc::new(self.settings);
        let include_timing = self.include_timing;

        let models: Vec<String> = self.targets.iter().map(|t| t.model.clone()).collect();
        let handles = self.targets.into_iter().map(|target| {
            let settings = Arc::clone(&settings);
            tokio::spawn(async move {
                let start = Instant::now();
                let outcome = sweep(&settings, &target).await;
                (outcome, start.elapsed().as_millis())
            })
        });
        let joined = join_all(handles).await;

        models
            .into_iter()
            .zip(joined)
            .map(|(model, joined)| {
                let (outcome, elapsed) = match joined {
                    Ok(done) => done,
                    Err(e) => (Err(LLMError::TaskError(format!("{model}: {e}"))), 0),
                };
                if let Err(err) = &outcome {
                    log::warn!("Model {model} failed: {err}");
                }
                ModelReport {
                    model,
                    outcome,
                    time_ms: if include_timing { elapsed } else { 0 },
                }
            })
            .collect()
    }

    /// Runs one model over every dataset in the catalog.
    pub async fn evaluate_model(&self, target: &ModelTarget) -> Result<ScoreRecord, LLMError> {
        sweep(&self.settings, target).await
    }

    /// Translates and scores an already loaded dataset.
    pub async fn evaluate_dataset(
        &self,
        target: &ModelTarget,
        dataset: &Dataset,
    ) -> Result<Score, LLMError> {
        translate_and_score(&self.settings, target, dataset).await
    }
}

async fn sweep(settings: &Settings, target: &ModelTarget) -> Result<ScoreRecord, LLMError> {
    let mut record = ScoreRecord::new();
    for spec in settings.catalog.iter() {
        log::info!("Translating {} with {}", spec.id, target.model);
        let score = run_dataset(settings, target, spec).await?;
        log::info!("{} - {} score: {}", target.model, spec.id, score.score);
        record.insert(spec.id.clone(), score);
    }
    Ok(record)
}

async fn run_dataset(
    settings: &Settings,
    target: &ModelTarget,
    spec: &DatasetSpec,
) -> Result<Score, LLMError> {
    log_stage(target, &spec.id, RunStage::Loading);
    let dataset = Dataset::load(spec, &settings.data_dir, settings.limit)?;
    translate_and_score(settings, target, &dataset).await
}

async fn translate_and_score(
    settings: &Settings,
    target: &ModelTarget,
    dataset: &Dataset,
) -> Result<Score, LLMError> {
    let spec = dataset.spec();
    log_stage(target, dataset.id(), RunStage::Dispatching);
    let prompts: Vec<String> = dataset
        .sources()
        .map(|sentence| {
            settings
                .template
                .render(&spec.source.label, &spec.target.label, sentence)
        })
        .collect();

    let translations = BatchTranslator::new(Arc::clone(&target.provider), target.model.as_str())
        .params(settings.params.clone())
        .batch_size(settings.batch_size)
        .translate(&prompts)
        .await?;

    log_stage(target, dataset.id(), RunStage::Scoring);
    let predictions: Vec<String> = translations.texts.iter().map(|t| t.to_lowercase()).collect();
    let references: Vec<String> = dataset.references().map(str::to_lowercase).collect();
    let scorer = Arc::clone(&settings.scorer);
    let score = tokio::task::spawn_blocking(move || scorer.score(&predictions, &references))
        .await
        .map_err(|e| LLMError::TaskError(format!("scorer task: {e}")))??;

    log_stage(target, dataset.id(), RunStage::Done);
    Ok(score)
}

fn log_stage(target: &ModelTarget, dataset: &str, stage: RunStage) {
    log::debug!("{} / {}: {}", target.model, dataset, stage);
}
