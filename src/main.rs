use std::env;
use std::sync::Arc;

use text2cypher::config::AppConfig;
use text2cypher::prompt::PromptTemplate;
use text2cypher::server::{build_router, AppState};
use text2cypher::system_prompt_config::SystemPromptConfig;
use text2cypher::util::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let system_prompt_config_arg = args
        .iter()
        .find(|a| a.starts_with("--system-prompt-config="))
        .and_then(|a| a.strip_prefix("--system-prompt-config="))
        .map(|s| s.to_string());

    let config = AppConfig::from_env();
    match &config.api_key {
        Some(key) => tracing::info!("OPENAI_API_KEY loaded ({} chars)", key.len()),
        None => tracing::warn!(
            "OPENAI_API_KEY not set; /convert will fail until the service is restarted with a key"
        ),
    }

    let prompt_config = if let Some(path) = system_prompt_config_arg {
        tracing::info!("Loading system prompt configuration from: {}", path);
        match SystemPromptConfig::load_from_file(&path) {
            Ok(cfg) => {
                tracing::info!("System prompt configuration loaded (enabled: {})", cfg.enabled);
                cfg
            }
            Err(e) => {
                tracing::error!("Failed to load system prompt config: {:#}", e);
                tracing::warn!("Continuing with the built-in system prompt");
                SystemPromptConfig::empty()
            }
        }
    } else {
        tracing::info!("No system prompt config provided, using the built-in prompt");
        SystemPromptConfig::empty()
    };
    let prompt = PromptTemplate::resolve(&prompt_config, &config.model);

    tracing::info!(
        model = %config.model,
        url = %config.api_url,
        temperature = config.temperature,
        timeout_secs = config.timeout.as_secs(),
        pre_call_delay_ms = config.pre_call_delay.as_millis() as u64,
        "Upstream configured"
    );

    let addr = config.bind_addr.clone();
    let state = Arc::new(AppState::from_config(config, prompt));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("text2cypher listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
