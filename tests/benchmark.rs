use std::path::Path;
use std::sync::{Arc, Mutex};

use llm_bench::{
    dataset::{DatasetCatalog, DatasetSpec, LanguageSide},
    evaluator::{ModelTarget, ParallelEvaluator},
    results::ResultWriter,
    scorer::{Score, Scorer},
    LLMBuilder, LLMError,
};
use mockito::Matcher;
use serde_json::json;

fn chat_body(content: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
}

fn catalog() -> DatasetCatalog {
    DatasetCatalog::new(vec![DatasetSpec::new(
        "flores/de-tr",
        LanguageSide::new("German-Turkish", "de_tr"),
        LanguageSide::new("English", "en"),
    )])
}

fn write_dataset(root: &Path, sources: &str, references: &str) {
    let dir = root.join("flores/de-tr");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("de_tr.txt"), sources).unwrap();
    std::fs::write(dir.join("en.txt"), references).unwrap();
}

type Calls = Arc<Mutex<Vec<(Vec<String>, Vec<String>)>>>;

fn exact_match(calls: Calls) -> Arc<dyn Scorer> {
    Arc::new(move |p: &[String], r: &[String]| -> Result<Score, LLMError> {
        calls.lock().unwrap().push((p.to_vec(), r.to_vec()));
        let hits = p.iter().zip(r).filter(|(a, b)| a == b).count();
        Ok(Score::new(100.0 * hits as f64 / p.len().max(1) as f64))
    })
}

#[tokio::test]
async fn end_to_end_against_mock_backend() {
    let data = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    write_dataset(
        data.path(),
        "hallo welt\nguten morgen\n",
        "Hello World\nGood morning\n",
    );

    let mut server = mockito::Server::new_async().await;
    let prompt_for = |sentence: &str| {
        format!(
            "Translate the following German-Turkish sentences to pure English line by line. \
             Do not output any additional text other than the translations:\n{sentence}"
        )
    };
    let mut mocks = Vec::new();
    for (sentence, answer) in [("hallo welt", "Hello World"), ("guten morgen", "GOOD MORNING")] {
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer k")
            .match_body(Matcher::PartialJson(json!({
                "messages": [{"role": "user", "content": prompt_for(sentence)}]
            })))
            .with_status(200)
            .with_body(chat_body(answer))
            .expect(1)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let client = LLMBuilder::new()
        .base_url(format!("{}/v1", server.url()))
        .api_key("k")
        .build()
        .unwrap();
    let calls: Calls = Arc::default();

    let reports = ParallelEvaluator::new(
        vec![ModelTarget::new("org/model", Arc::new(client))],
        exact_match(calls.clone()),
    )
    .catalog(catalog())
    .data_dir(data.path())
    .batch_size(1)
    .evaluate_parallel()
    .await;

    let record = reports[0].outcome.as_ref().unwrap();
    assert_eq!(record.get("flores/de-tr").unwrap().score, 100.0);
    {
        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].0, ["hello world", "good morning"]);
        assert_eq!(calls[0].1, ["hello world", "good morning"]);
    }

    let path = ResultWriter::new(results.path())
        .write(&reports[0].model, record)
        .unwrap();
    assert_eq!(path, results.path().join("org_model.json"));
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["flores/de-tr"]["score"], 100.0);

    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn failing_backend_only_fails_its_model() {
    let data = tempfile::tempdir().unwrap();
    write_dataset(data.path(), "hallo welt\n", "hello world\n");

    let mut server = mockito::Server::new_async().await;
    let _bad = server
        .mock("POST", "/bad/v1/chat/completions")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;
    let _good = server
        .mock("POST", "/good/v1/chat/completions")
        .with_status(200)
        .with_body(chat_body("hello world"))
        .create_async()
        .await;

    let target = |prefix: &str| {
        let client = LLMBuilder::new()
            .base_url(format!("{}/{prefix}/v1", server.url()))
            .build()
            .unwrap();
        ModelTarget::new(prefix, Arc::new(client))
    };

    let reports = ParallelEvaluator::new(
        vec![target("bad"), target("good")],
        exact_match(Arc::default()),
    )
    .catalog(catalog())
    .data_dir(data.path())
    .evaluate_parallel()
    .await;

    assert!(matches!(
        reports[0].outcome,
        Err(LLMError::UpstreamError { status: 500, .. })
    ));
    assert_eq!(
        reports[1]
            .outcome
            .as_ref()
            .unwrap()
            .get("flores/de-tr")
            .unwrap()
            .score,
        100.0
    );
}
