use thiserror::Error;

/// Error types that can occur while dispatching requests or running a benchmark.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Bad or missing endpoint/provider selection, or invalid run settings
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// The backend rejected the credentials (HTTP 401/403)
    #[error("Auth error: HTTP {status}: {body}")]
    AuthError { status: u16, body: String },
    /// Any other non-success HTTP status from a generation call
    #[error("Upstream error: HTTP {status}: {body}")]
    UpstreamError { status: u16, body: String },
    /// Response body is missing the fields we extract text from
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// Source and reference files do not line up
    #[error(
        "Data integrity error in '{dataset}': {sources} source lines but {references} reference lines"
    )]
    DataIntegrity {
        dataset: String,
        sources: usize,
        references: usize,
    },
    /// Transport-level failures (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
    /// Reading datasets or writing results failed
    #[error("IO error: {0}")]
    Io(String),
    /// The external scorer failed or produced unusable output
    #[error("Scorer error: {0}")]
    ScorerError(String),
    /// A spawned model task panicked or was cancelled
    #[error("Task error: {0}")]
    TaskError(String),
}

impl LLMError {
    /// Maps a non-success HTTP status to the matching error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => LLMError::AuthError { status, body },
            _ => LLMError::UpstreamError { status, body },
        }
    }
}

/// Converts reqwest HTTP errors into LLMErrors
impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        LLMError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        LLMError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl From<std::io::Error> for LLMError {
    fn from(err: std::io::Error) -> Self {
        LLMError::Io(err.to_string())
    }
}
