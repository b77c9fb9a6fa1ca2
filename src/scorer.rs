//! The n-gram overlap metric, treated as an opaque collaborator.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::LLMError;

/// Output of a scorer: a numeric `score` plus whatever else it reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub score: f64,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Score {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            details: Map::new(),
        }
    }

    /// Parses a scorer's JSON object, requiring a numeric `score` field.
    pub fn from_json(value: Value) -> Result<Self, LLMError> {
        let value = match value {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            other => other,
        };
        let raw = value.to_string();
        serde_json::from_value(value)
            .map_err(|e| LLMError::ScorerError(format!("invalid scorer output ({e}): {raw}")))
    }
}

/// Scores a full set of predictions against aligned references in one call.
pub trait Scorer: Send + Sync {
    fn score(&self, predictions: &[String], references: &[String]) -> Result<Score, LLMError>;
}

impl<F> Scorer for F
where
    F: Fn(&[String], &[String]) -> Result<Score, LLMError> + Send + Sync,
{
    fn score(&self, predictions: &[String], references: &[String]) -> Result<Score, LLMError> {
        self(predictions, references)
    }
}

/// Runs the `sacrebleu` command line tool.
///
/// Predictions and references are written one per line to temporary files,
/// then `sacrebleu <refs> -i <hyps> -m bleu -f json` is executed and its JSON
/// report becomes the [`Score`].
#[derive(Debug, Clone)]
pub struct SacreBleuCommand {
    program: PathBuf,
    leading_args: Vec<String>,
    extra_args: Vec<String>,
}

impl Default for SacreBleuCommand {
    fn default() -> Self {
        Self::new("sacrebleu")
    }
}

impl SacreBleuCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            extra_args: Vec::new(),
        }
    }

    /// `python -m sacrebleu`, for installs without the console script.
    pub fn python_module(python: impl Into<PathBuf>) -> Self {
        Self::new(python).leading_arg("-m").leading_arg("sacrebleu")
    }

    /// Argument placed before the reference file.
    pub fn leading_arg(mut self, arg: impl Into<String>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Argument appended after the built-in ones.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    fn write_lines(lines: &[String]) -> Result<NamedTempFile, LLMError> {
        let mut file = NamedTempFile::new()?;
        for line in lines {
            // One sentence per line; embedded newlines would shift alignment.
            writeln!(file, "{}", line.replace(['\r', '\n'], " "))?;
        }
        file.flush()?;
        Ok(file)
    }
}

impl Scorer for SacreBleuCommand {
    fn score(&self, predictions: &[String], references: &[String]) -> Result<Score, LLMError> {
        let hyps = Self::write_lines(predictions)?;
        let refs = Self::write_lines(references)?;

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(refs.path())
            .arg("-i")
            .arg(hyps.path())
            .args(["-m", "bleu", "-f", "json"])
            .args(&self.extra_args)
            .output()
            .map_err(|e| {
                LLMError::ScorerError(format!("failed to run {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            return Err(LLMError::ScorerError(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let value: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            LLMError::ScorerError(format!(
                "unparseable output ({e}): {}",
                String::from_utf8_lossy(&output.stdout).trim()
            ))
        })?;
        Score::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn score_keeps_extra_fields() {
        let score = Score::from_json(json!({
            "name": "BLEU",
            "score": 41.2,
            "signature": "nrefs:1|case:mixed"
        }))
        .unwrap();
        assert_eq!(score.score, 41.2);
        assert_eq!(score.details["name"], "BLEU");

        let round_trip = serde_json::to_value(&score).unwrap();
        assert_eq!(round_trip["score"], 41.2);
        assert_eq!(round_trip["signature"], "nrefs:1|case:mixed");
    }

    #[test]
    fn score_accepts_single_element_list() {
        let score = Score::from_json(json!([{"score": 12.5}])).unwrap();
        assert_eq!(score.score, 12.5);
    }

    #[test]
    fn score_requires_numeric_score() {
        assert!(matches!(
            Score::from_json(json!({"name": "BLEU"})),
            Err(LLMError::ScorerError(_))
        ));
        assert!(matches!(
            Score::from_json(json!({"score": "high"})),
            Err(LLMError::ScorerError(_))
        ));
    }

    #[test]
    fn closures_are_scorers() {
        let exact = |p: &[String], r: &[String]| -> Result<Score, LLMError> {
            let hits = p.iter().zip(r).filter(|(a, b)| a == b).count();
            Ok(Score::new(hits as f64))
        };
        let score = exact
            .score(&["a".into(), "b".into()], &["a".into(), "c".into()])
            .unwrap();
        assert_eq!(score.score, 1.0);
    }

    #[test]
    fn missing_program_is_scorer_error() {
        let scorer = SacreBleuCommand::new("/nonexistent/sacrebleu-binary");
        let err = scorer.score(&["a".into()], &["a".into()]).unwrap_err();
        assert!(matches!(err, LLMError::ScorerError(_)));
    }

    #[cfg(unix)]
    #[test]
    fn command_output_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-sacrebleu.sh");
        std::fs::write(
            &script,
            "test \"$2\" = -i || exit 2\necho '{\"name\": \"BLEU\", \"score\": 100.0}'\n",
        )
        .unwrap();

        let score = SacreBleuCommand::new("sh")
            .leading_arg(script.to_string_lossy())
            .score(&["hello world".into()], &["hello world".into()])
            .unwrap();
        assert_eq!(score.score, 100.0);
        assert_eq!(score.details["name"], "BLEU");
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_scorer_error() {
        let err = SacreBleuCommand::new("sh")
            .leading_arg("-c")
            .leading_arg("echo broken >&2; exit 3")
            .score(&["a".into()], &["a".into()])
            .unwrap_err();
        match err {
            LLMError::ScorerError(msg) => assert!(msg.contains("broken"), "{msg}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn python_module_prefixes_arguments() {
        let cmd = SacreBleuCommand::python_module("python3");
        assert_eq!(cmd.leading_args, ["-m", "sacrebleu"]);
    }
}
