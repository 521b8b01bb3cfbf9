//! Upstream Chat Completions client.
//!
//! One call = optional pacing delay + exactly one POST. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{ApiCredential, AppConfig};
use crate::error::CompletionError;
use crate::models::chat::{ChatCompletionRequest, ChatCompletionResponse};
use crate::prompt::Prompt;
use crate::rate_limit::RateLimiter;

/// Something that turns a prompt into the model's reply text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the trimmed, non-empty reply or the reason there is none.
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    api_key: Option<ApiCredential>,
    limiter: Arc<dyn RateLimiter>,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, config: &AppConfig, limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            http,
            url: config.api_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout,
            api_key: config.api_key.clone(),
            limiter,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Outbound payload for `prompt`.
    pub fn build_request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: prompt.to_messages(),
            temperature: Some(self.temperature),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        self.limiter.acquire().await;

        let key = self
            .api_key
            .as_ref()
            .ok_or(CompletionError::MissingCredential)?;

        let payload = self.build_request(prompt);
        tracing::debug!(
            url = %self.url,
            model = %self.model,
            timeout_secs = self.timeout.as_secs(),
            "sending chat completion request"
        );

        let resp = self
            .http
            .post(&self.url)
            .header(http::header::CONTENT_TYPE, "application/json")
            .bearer_auth(key.expose())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        extract_content(&bytes)
    }
}

/// Pull `choices[0].message.content` out of a 2xx body and trim it.
pub fn extract_content(body: &[u8]) -> Result<String, CompletionError> {
    let parsed: ChatCompletionResponse = serde_json::from_slice(body)
        .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

    if parsed.choices.is_empty() {
        return Err(CompletionError::MalformedResponse(
            "response has no choices".into(),
        ));
    }
    let content = parsed.first_content().ok_or_else(|| {
        CompletionError::MalformedResponse("choices[0].message.content is missing".into())
    })?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CompletionError::EmptyContent);
    }
    Ok(trimmed.to_string())
}
