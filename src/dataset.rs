//! Paired source/reference sentence collections.
//!
//! A dataset lives at `{data_dir}/{id}/` as two line-aligned UTF-8 files,
//! one sentence per line: `{source_file}.txt` and `{target_file}.txt`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LLMError;

/// A language label used in the prompt plus the file stem holding its side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSide {
    /// Human-readable language name embedded in the prompt, e.g. `"English"`.
    pub label: String,
    /// File stem under the dataset directory, e.g. `"en"`.
    pub file: String,
}

impl LanguageSide {
    pub fn new(label: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            file: file.into(),
        }
    }
}

/// Declares one translation dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub id: String,
    pub source: LanguageSide,
    pub target: LanguageSide,
}

impl DatasetSpec {
    pub fn new(id: impl Into<String>, source: LanguageSide, target: LanguageSide) -> Self {
        Self {
            id: id.into(),
            source,
            target,
        }
    }

    pub fn source_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.id).join(format!("{}.txt", self.source.file))
    }

    pub fn target_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.id).join(format!("{}.txt", self.target.file))
    }
}

/// Ordered, immutable list of datasets a benchmark sweeps over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetCatalog {
    specs: Vec<DatasetSpec>,
}

impl DatasetCatalog {
    pub fn new(specs: Vec<DatasetSpec>) -> Self {
        Self { specs }
    }

    /// The code-switched FLORES splits and the Hindi-English set.
    pub fn flores() -> Self {
        let side = LanguageSide::new;
        Self::new(vec![
            DatasetSpec::new(
                "flores/de-tr",
                side("German-Turkish", "de_tr"),
                side("English", "en"),
            ),
            DatasetSpec::new(
                "flores/en-zh",
                side("English-Chinese", "en_zh"),
                side("Chinese", "zh"),
            ),
            DatasetSpec::new(
                "flores/fr-it",
                side("French-Italian", "fr_it"),
                side("Japanese", "jp"),
            ),
            DatasetSpec::new(
                "flores/ta-en",
                side("Tamil-English", "ta_en"),
                side("Czech", "cz"),
            ),
            DatasetSpec::new(
                "hindi_english",
                side("Hindi-English", "hi_en"),
                side("English", "en"),
            ),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for DatasetCatalog {
    fn default() -> Self {
        Self::flores()
    }
}

/// One aligned pair: `source` translates to `reference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    pub source: String,
    pub reference: String,
}

/// A loaded dataset whose sources and references have equal length.
#[derive(Debug, Clone)]
pub struct Dataset {
    spec: DatasetSpec,
    records: Vec<DatasetRecord>,
}

impl Dataset {
    /// Pairs `sources` with `references` after checking they line up, then
    /// keeps the first `limit` pairs. `None` and `Some(0)` keep everything.
    pub fn from_lines(
        spec: DatasetSpec,
        sources: Vec<String>,
        references: Vec<String>,
        limit: Option<usize>,
    ) -> Result<Self, LLMError> {
        if sources.len() != references.len() {
            return Err(LLMError::DataIntegrity {
                dataset: spec.id.clone(),
                sources: sources.len(),
                references: references.len(),
            });
        }
        let take = limit.filter(|&n| n > 0).unwrap_or(usize::MAX);
        let records = sources
            .into_iter()
            .zip(references)
            .take(take)
            .map(|(source, reference)| DatasetRecord { source, reference })
            .collect();
        Ok(Self { spec, records })
    }

    /// Reads both files of `spec` under `data_dir`.
    pub fn load(
        spec: &DatasetSpec,
        data_dir: &Path,
        limit: Option<usize>,
    ) -> Result<Self, LLMError> {
        let sources = read_lines(&spec.source_path(data_dir))?;
        let references = read_lines(&spec.target_path(data_dir))?;
        log::debug!(
            "Loaded {}: {} source lines, {} reference lines",
            spec.id,
            sources.len(),
            references.len()
        );
        Self::from_lines(spec.clone(), sources, references, limit)
    }

    pub fn spec(&self) -> &DatasetSpec {
        &self.spec
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.source.as_str())
    }

    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.reference.as_str())
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, LLMError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| LLMError::Io(format!("{}: {e}", path.display())))?;
    Ok(contents.lines().map(|l| l.trim().to_string()).collect())
}
