use thiserror::Error;

/// Why a completion call produced no Cypher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("upstream request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("upstream returned empty content")]
    EmptyContent,
}

impl CompletionError {
    /// Stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::MissingCredential => "missing_credential",
            CompletionError::Timeout => "timeout",
            CompletionError::Network(_) => "network",
            CompletionError::Status { .. } => "status",
            CompletionError::MalformedResponse(_) => "malformed_response",
            CompletionError::EmptyContent => "empty_content",
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CompletionError::Timeout
        } else if e.is_decode() {
            CompletionError::MalformedResponse(e.to_string())
        } else {
            CompletionError::Network(e.to_string())
        }
    }
}

/// Startup configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
