use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http::StatusCode;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::client::{CompletionClient, OpenAiClient};
use crate::config::AppConfig;
use crate::error::CompletionError;
use crate::models::convert::{ConversionRequest, ConversionResponse, ErrorBody};
use crate::observer::{ConversionObserver, TracingObserver};
use crate::prompt::PromptTemplate;
use crate::rate_limit::limiter_for;
use crate::util::{build_http_client_from_env, cors_layer_from_env, text_response};

/// Shared, read-only state for all handlers.
pub struct AppState {
    pub config: AppConfig,
    pub prompt: PromptTemplate,
    pub client: Arc<dyn CompletionClient>,
    pub observer: Arc<dyn ConversionObserver>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        prompt: PromptTemplate,
        client: Arc<dyn CompletionClient>,
        observer: Arc<dyn ConversionObserver>,
    ) -> Self {
        Self {
            config,
            prompt,
            client,
            observer,
        }
    }

    /// Production wiring: OpenAI client paced by the configured delay, tracing observer.
    pub fn from_config(config: AppConfig, prompt: PromptTemplate) -> Self {
        let limiter = limiter_for(config.pre_call_delay);
        let client = OpenAiClient::new(build_http_client_from_env(), &config, limiter);
        Self::new(config, prompt, Arc::new(client), Arc::new(TracingObserver))
    }
}

/// Build the Axum router with `/convert`, `/check-key` and `/status`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/convert", post(convert))
        .route("/check-key", get(check_key))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer_from_env()),
        )
}

/// Service status: name, version, model and whether a credential is loaded.
async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "text2cypher",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.model,
        "credential_present": state.config.api_key.is_some(),
        "routes": ["/status", "/convert", "/check-key"]
    }))
}

/// Translate `{"text": ...}` into `{"cypher": ...}`.
///
/// The body is parsed leniently; every upstream failure becomes the same 500.
async fn convert(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let req = ConversionRequest::from_body(&body);
    let request_id = uuid::Uuid::new_v4().to_string();
    state.observer.on_request(&request_id, &req.text);

    let prompt = state.prompt.render(&req.text);

    // Detached so a client disconnect does not abort the upstream call or
    // the outcome logging.
    let task_state = state.clone();
    let task_id = request_id.clone();
    let outcome = tokio::spawn(async move {
        let outcome = match task_state.client.complete(&prompt).await {
            Ok(cypher) if cypher.is_empty() => Err(CompletionError::EmptyContent),
            other => other,
        };
        record_outcome(&task_state, &task_id, &outcome);
        outcome
    })
    .await
    .unwrap_or_else(|e| {
        let outcome = Err(CompletionError::Network(format!("completion task failed: {e}")));
        record_outcome(&state, &request_id, &outcome);
        outcome
    });

    match outcome {
        Ok(cypher) => (StatusCode::OK, Json(ConversionResponse { cypher })).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::conversion_failed()),
        )
            .into_response(),
    }
}

fn record_outcome(state: &AppState, request_id: &str, outcome: &Result<String, CompletionError>) {
    match outcome {
        Ok(cypher) => state.observer.on_success(request_id, cypher),
        Err(error) => {
            tracing::error!(request_id, kind = error.kind(), error = %error, "Cypher generation failed");
            state.observer.on_failure(request_id, error);
        }
    }
}

/// Report whether the upstream credential is loaded, and its length.
async fn check_key(State(state): State<Arc<AppState>>) -> Response {
    match &state.config.api_key {
        Some(key) => text_response(
            StatusCode::OK,
            format!("OPENAI_API_KEY loaded. Length: {}", key.len()),
        ),
        None => text_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "OPENAI_API_KEY not found.",
        ),
    }
}
