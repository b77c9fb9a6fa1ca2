use env_logger::Env;

/// Logs to stderr at `info` for this crate unless `RUST_LOG` says otherwise.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "llm_bench=debug" } else { "llm_bench=info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}
