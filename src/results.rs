//! Per-model result files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::LLMError;

/// Writes one pretty-printed JSON document per model under a directory.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    dir: PathBuf,
}

impl ResultWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/{model}.json`, with `/` in the model identifier replaced by `_`.
    pub fn path_for(&self, model: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(model)))
    }

    /// Serializes `results` with two-space indentation, creating the
    /// directory when needed. Returns the written path.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        model: &str,
        results: &T,
    ) -> Result<PathBuf, LLMError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| LLMError::Io(format!("{}: {e}", self.dir.display())))?;
        let path = self.path_for(model);
        let contents = serde_json::to_string_pretty(results)?;
        fs::write(&path, contents).map_err(|e| LLMError::Io(format!("{}: {e}", path.display())))?;
        log::info!("Wrote results for {model} to {}", path.display());
        Ok(path)
    }
}

fn file_stem(model: &str) -> String {
    model.replace(['/', '\\'], "_")
}
