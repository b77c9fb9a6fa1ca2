mod evaluator;
mod types;

pub use evaluator::{ModelTarget, ParallelEvaluator};
pub use types::{ModelReport, RunStage, ScoreRecord};
