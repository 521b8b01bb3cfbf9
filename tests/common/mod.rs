#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use http::StatusCode;
use text2cypher::client::{CompletionClient, OpenAiClient};
use text2cypher::config::AppConfig;
use text2cypher::error::CompletionError;
use text2cypher::models::chat::ChatCompletionRequest;
use text2cypher::observer::{ConversionObserver, NoopObserver};
use text2cypher::prompt::{Prompt, PromptTemplate};
use text2cypher::rate_limit::RateLimiter;
use text2cypher::server::{build_router, AppState};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/* =============================================
   Application under test
   ============================================= */

/// The real router bound to an ephemeral local port.
pub struct TestServer {
    pub base_url: String,
    pub addr: SocketAddr,
    join: JoinHandle<()>,
    client: reqwest::Client,
}

impl TestServer {
    fn make_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed building reqwest client")
    }

    pub async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    pub async fn post_json<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
    }

    pub async fn post_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header(http::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Spawn the app with an explicit completion client.
pub async fn spawn_app(config: AppConfig, client: Arc<dyn CompletionClient>) -> TestServer {
    spawn_app_with_observer(config, client, Arc::new(NoopObserver)).await
}

pub async fn spawn_app_with_observer(
    config: AppConfig,
    client: Arc<dyn CompletionClient>,
    observer: Arc<dyn ConversionObserver>,
) -> TestServer {
    let state = Arc::new(AppState::new(
        config,
        PromptTemplate::default(),
        client,
        observer,
    ));
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let base_url = format!("http://{}", addr);
    let server = axum::serve(listener, app.into_make_service());

    let join = tokio::spawn(async move {
        if let Err(e) = server.await {
            eprintln!("Test server error: {e:?}");
        }
    });

    TestServer {
        base_url,
        addr,
        join,
        client: TestServer::make_client(),
    }
}

/// Spawn the app wired to a real `OpenAiClient` pointing at `upstream`.
pub async fn spawn_app_with_upstream(
    config: AppConfig,
    limiter: Arc<dyn RateLimiter>,
) -> TestServer {
    let client = OpenAiClient::new(reqwest::Client::new(), &config, limiter);
    spawn_app(config, Arc::new(client)).await
}

/// Config pointing at a stub upstream, with a key and no pacing.
pub fn test_config(upstream_url: &str) -> AppConfig {
    AppConfig {
        api_url: format!("{upstream_url}/v1/chat/completions"),
        pre_call_delay: Duration::ZERO,
        ..AppConfig::default()
    }
    .with_api_key("sk-test-upstream")
}

/* =============================================
   In-process completion client stubs
   ============================================= */

/// Records every prompt and replies with a canned result.
pub struct StubCompletionClient {
    reply: Result<String, CompletionError>,
    delay: Duration,
    prompts: Mutex<Vec<Prompt>>,
    completed: AtomicUsize,
}

impl StubCompletionClient {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: CompletionError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn delayed(text: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            delay,
            prompts: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().expect("lock prompts").clone()
    }

    /// Calls that ran to the end instead of being dropped mid-flight.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for StubCompletionClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        self.prompts.lock().expect("lock prompts").push(prompt.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

/* =============================================
   Stub Chat Completions upstream
   ============================================= */

#[derive(Clone)]
pub enum UpstreamReply {
    /// 200 with `choices[0].message.content` set to the string.
    Content(String),
    /// Arbitrary status and raw body.
    Raw { status: StatusCode, body: String },
    /// Sleep before answering with the content.
    Slow { delay: Duration, content: String },
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: ChatCompletionRequest,
}

#[derive(Clone)]
struct UpstreamState {
    reply: UpstreamReply,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

#[derive(Clone)]
pub struct UpstreamStub {
    base_url: String,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    shutdown: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl UpstreamStub {
    pub async fn start(reply: UpstreamReply) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(UpstreamState {
            reply,
            calls: calls.clone(),
            requests: requests.clone(),
        });

        let router = Router::new()
            .route("/v1/chat/completions", post(completions_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let addr = listener.local_addr().expect("stub upstream local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let server = axum::serve(listener, router.into_make_service());
        tokio::spawn(async move {
            tokio::select! {
                res = server => {
                    if let Err(err) = res {
                        eprintln!("Stub upstream server error: {err:?}");
                    }
                }
                _ = rx => {}
            }
        });

        UpstreamStub {
            base_url: format!("http://{}", addr),
            calls,
            requests,
            shutdown: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub fn url(&self) -> String {
        self.base_url.clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn take_requests(&self) -> Vec<CapturedRequest> {
        let mut guard = self.requests.lock().expect("lock stub requests");
        guard.drain(..).collect()
    }
}

impl Drop for UpstreamStub {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.shutdown.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
    }
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-stub",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo-16k",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
    .to_string()
}

async fn completions_handler(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    Json(req): Json<ChatCompletionRequest>,
) -> (StatusCode, [(http::header::HeaderName, &'static str); 1], String) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    if let Ok(mut guard) = state.requests.lock() {
        guard.push(CapturedRequest {
            authorization: headers
                .get(http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            body: req,
        });
    }

    let json_ct = [(http::header::CONTENT_TYPE, "application/json")];
    match &state.reply {
        UpstreamReply::Content(content) => (StatusCode::OK, json_ct, completion_body(content)),
        UpstreamReply::Raw { status, body } => (*status, json_ct, body.clone()),
        UpstreamReply::Slow { delay, content } => {
            tokio::time::sleep(*delay).await;
            (StatusCode::OK, json_ct, completion_body(content))
        }
    }
}

/// A question/answer pair taken from the built-in prompt examples.
pub const OPENAI_QUESTION: &str = "Who is most connected to OpenAI?";
pub const OPENAI_CYPHER: &str = "MATCH (n {id: 'OpenAI'})-[r:CONNECTED_TO]-(m) RETURN m.id, r.weight ORDER BY r.weight DESC LIMIT 1";
