use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use llm_bench::{
    config::BenchConfig,
    evaluator::{ModelReport, ModelTarget, ParallelEvaluator},
    results::ResultWriter,
    LLMError,
};

use crate::args::CliArgs;
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);
    let config = args.load_config().context("loading configuration")?;

    if args.list_providers {
        let table = config.endpoint_table();
        for name in table.names() {
            println!("{name:<12} {}", table.resolve(name)?);
        }
        return Ok(());
    }

    config.validate()?;
    if config.models.is_empty() {
        bail!("no models to benchmark; pass --model provider:model or list them in --config");
    }

    let reports = evaluator(&config)?.evaluate_parallel().await;
    report(&config, &reports)
}

fn evaluator(config: &BenchConfig) -> Result<ParallelEvaluator, LLMError> {
    let targets = config
        .models
        .iter()
        .map(|model| {
            let client = config.client_for(model)?;
            log::info!("{} -> {}", model.model, client.endpoint());
            Ok(ModelTarget::new(model.model.as_str(), Arc::new(client)))
        })
        .collect::<Result<Vec<_>, LLMError>>()?;

    Ok(ParallelEvaluator::new(targets, Arc::new(config.scorer.command()))
        .catalog(config.catalog())
        .data_dir(&config.data_dir)
        .limit(config.num_test)
        .batch_size(config.batch_size)
        .params(config.sampling.clone()))
}

/// Writes result files for successful models and fails if any model failed
/// or any result could not be written.
fn report(config: &BenchConfig, reports: &[ModelReport]) -> anyhow::Result<()> {
    let writer = ResultWriter::new(&config.results_dir);
    log::info!("Writing results to {}", writer.dir().display());
    let summary = write_reports(&writer, reports);

    if !summary.failed.is_empty() || !summary.unwritten.is_empty() {
        bail!(
            "{} of {} models failed: {}; {} result files not written: {}",
            summary.failed.len(),
            reports.len(),
            summary.failed.join(", "),
            summary.unwritten.len(),
            summary.unwritten.join(", ")
        );
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Summary {
    failed: Vec<String>,
    unwritten: Vec<String>,
}

/// Prints every report and writes each successful one, carrying on past
/// failures.
fn write_reports(writer: &ResultWriter, reports: &[ModelReport]) -> Summary {
    let mut summary = Summary::default();
    for report in reports {
        match &report.outcome {
            Ok(record) => {
                for (dataset, score) in record.iter() {
                    println!("{:<48} {:<16} {:>8.2}", report.model, dataset, score.score);
                }
                log::info!("{} finished in {} ms", report.model, report.time_ms);
                if let Err(err) = writer.write(&report.model, record) {
                    log::error!("Could not write results for {}: {err}", report.model);
                    summary.unwritten.push(report.model.clone());
                }
            }
            Err(err) => {
                println!("{:<48} FAILED: {err}", report.model);
                summary.failed.push(report.model.clone());
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_bench::{evaluator::ScoreRecord, scorer::Score};

    fn success(model: &str) -> ModelReport {
        let mut record = ScoreRecord::new();
        record.insert("flores/de-tr", Score::new(10.0));
        ModelReport {
            model: model.to_string(),
            outcome: Ok(record),
            time_ms: 0,
        }
    }

    #[test]
    fn write_failure_does_not_stop_later_models() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the first model's file should go.
        std::fs::create_dir_all(dir.path().join("first.json")).unwrap();
        let failure = ModelReport {
            model: "broken".to_string(),
            outcome: Err(LLMError::UpstreamError {
                status: 500,
                body: "boom".into(),
            }),
            time_ms: 0,
        };

        let summary = write_reports(
            &ResultWriter::new(dir.path()),
            &[success("first"), failure, success("second")],
        );

        assert_eq!(summary.unwritten, ["first"]);
        assert_eq!(summary.failed, ["broken"]);
        assert!(dir.path().join("second.json").is_file());
    }
}
