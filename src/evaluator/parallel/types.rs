use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{error::LLMError, scorer::Score};

/// Phases a single (dataset, model) run moves through.
///
/// `Dispatching` and `AwaitingBatch` alternate until every sentence has
/// been submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Loading,
    Dispatching,
    AwaitingBatch,
    Scoring,
    Done,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunStage::Loading => "loading",
            RunStage::Dispatching => "dispatching",
            RunStage::AwaitingBatch => "awaiting batch",
            RunStage::Scoring => "scoring",
            RunStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Scores of one model, keyed by dataset id in evaluation order.
///
/// Serializes as a JSON object `{dataset_id: scorer_output, ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreRecord {
    entries: Vec<(String, Score)>,
}

impl ScoreRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `score` under `dataset`, replacing an earlier entry.
    pub fn insert(&mut self, dataset: impl Into<String>, score: Score) {
        let dataset = dataset.into();
        match self.entries.iter_mut().find(|(id, _)| *id == dataset) {
            Some(entry) => entry.1 = score,
            None => self.entries.push((dataset, score)),
        }
    }

    pub fn get(&self, dataset: &str) -> Option<&Score> {
        self.entries
            .iter()
            .find(|(id, _)| id == dataset)
            .map(|(_, score)| score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Score)> {
        self.entries.iter().map(|(id, score)| (id.as_str(), score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ScoreRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (dataset, score) in &self.entries {
            map.serialize_entry(dataset, score)?;
        }
        map.end()
    }
}

/// Outcome of one model's full dataset sweep.
#[derive(Debug)]
pub struct ModelReport {
    /// Model identifier as sent to the backend.
    pub model: String,
    pub outcome: Result<ScoreRecord, LLMError>,
    /// Wall time of the sweep in milliseconds (0 when timing is disabled).
    pub time_ms: u128,
}

impl ModelReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_in_insertion_order() {
        let mut record = ScoreRecord::new();
        record.insert("flores/de-tr", Score::new(12.0));
        record.insert("flores/en-zh", Score::new(30.5));
        record.insert("flores/de-tr", Score::new(13.0));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("flores/de-tr").unwrap().score, 13.0);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"flores/de-tr":{"score":13.0},"flores/en-zh":{"score":30.5}}"#
        );
    }

    #[test]
    fn stage_names() {
        assert_eq!(RunStage::AwaitingBatch.to_string(), "awaiting batch");
        assert_eq!(RunStage::Done.to_string(), "done");
    }
}
