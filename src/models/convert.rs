use serde::{Deserialize, Serialize};

/// Message returned for every failed conversion. The upstream cause is only logged.
pub const CONVERSION_FAILED: &str = "Failed to generate Cypher query.";

/// Inbound `/convert` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    #[serde(default)]
    pub text: String,
}

impl ConversionRequest {
    /// Parse a request body without ever rejecting it.
    ///
    /// An empty body, invalid JSON, a non-object document, a missing `text`
    /// or a non-string `text` all produce `text = ""`.
    pub fn from_body(body: &[u8]) -> Self {
        let text = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("text")
                    .and_then(|t| t.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_default();
        Self { text }
    }
}

/// Successful `/convert` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub cypher: String,
}

/// Failed `/convert` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn conversion_failed() -> Self {
        Self {
            error: CONVERSION_FAILED.to_string(),
        }
    }
}
