use crate::error::CompletionError;

/// Hook invoked at each step of a `/convert` request.
///
/// Default methods do nothing, so implementors only override what they need.
pub trait ConversionObserver: Send + Sync {
    fn on_request(&self, _request_id: &str, _text: &str) {}
    fn on_success(&self, _request_id: &str, _cypher: &str) {}
    fn on_failure(&self, _request_id: &str, _error: &CompletionError) {}
}

/// Emits one `tracing` event per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ConversionObserver for TracingObserver {
    fn on_request(&self, request_id: &str, text: &str) {
        tracing::info!(request_id, text, "convert: incoming text");
    }

    fn on_success(&self, request_id: &str, cypher: &str) {
        tracing::info!(request_id, cypher, "convert: generated cypher");
    }

    fn on_failure(&self, request_id: &str, error: &CompletionError) {
        tracing::info!(request_id, kind = error.kind(), "convert: no cypher generated");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}
