//! Batched translation runs and their scoring.

mod batch;
mod parallel;
mod prompt;

pub use batch::{BatchTranslator, Translations, DEFAULT_BATCH_SIZE};
pub use parallel::{ModelReport, ModelTarget, ParallelEvaluator, RunStage, ScoreRecord};
pub use prompt::{PromptTemplate, DEFAULT_TEMPLATE};
