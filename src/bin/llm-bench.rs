#[path = "llm-bench/app.rs"]
mod app;
#[path = "llm-bench/args.rs"]
mod args;
#[path = "llm-bench/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
