use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tracing_subscriber::{fmt, EnvFilter};

/// Load the env file and install the global tracing subscriber (respects RUST_LOG).
///
/// Env file lookup order: ENV_FILE, DOTENV_PATH, then `.env` discovery from the
/// working directory. Existing variables are never overwritten.
pub fn init_tracing() {
    let mut env_source: String = "none".into();
    for key in ["ENV_FILE", "DOTENV_PATH"] {
        if let Ok(p) = std::env::var(key) {
            let p = p.trim();
            if !p.is_empty()
                && std::path::Path::new(p).is_file()
                && dotenvy::from_filename(p).is_ok()
            {
                env_source = format!("{p} ({key})");
                break;
            }
        }
    }

    if env_source == "none" {
        if let Ok(path) = dotenvy::dotenv() {
            env_source = path.display().to_string();
        }
    }

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("Environment loaded from: {}", env_source);
}

fn truthy(key: &str) -> bool {
    std::env::var(key)
        .map(|v| {
            let v = v.trim().to_ascii_lowercase();
            v == "1" || v == "true" || v == "yes" || v == "on"
        })
        .unwrap_or(false)
}

/// Build the outbound HTTP client honoring proxy environment variables.
///
/// Environment:
/// - TEXT2CYPHER_NO_PROXY = 1|true|yes|on  -> disable all proxies
/// - TEXT2CYPHER_PROXY_URL = <url>         -> proxy for all schemes
/// - HTTP_PROXY / http_proxy               -> HTTP proxy
/// - HTTPS_PROXY / https_proxy             -> HTTPS proxy
///
/// The request timeout is applied per call by the completion client.
pub fn build_http_client_from_env() -> reqwest::Client {
    let mut builder = reqwest::Client::builder();

    if truthy("TEXT2CYPHER_NO_PROXY") {
        builder = builder.no_proxy();
    } else {
        let proxies: [(&str, fn(&str) -> reqwest::Result<reqwest::Proxy>); 3] = [
            ("TEXT2CYPHER_PROXY_URL", |u| reqwest::Proxy::all(u)),
            ("HTTP_PROXY", |u| reqwest::Proxy::http(u)),
            ("HTTPS_PROXY", |u| reqwest::Proxy::https(u)),
        ];
        for (key, make) in proxies {
            let value = std::env::var(key).or_else(|_| std::env::var(key.to_ascii_lowercase()));
            if let Ok(url) = value {
                let u = url.trim();
                if u.is_empty() {
                    continue;
                }
                match make(u) {
                    Ok(p) => builder = builder.proxy(p),
                    Err(e) => tracing::warn!("Ignoring invalid {}: {}", key, e),
                }
            }
        }
    }

    builder = builder.user_agent(format!("text2cypher/{}", env!("CARGO_PKG_VERSION")));

    builder.build().unwrap_or_else(|e| {
        tracing::warn!("Falling back to default HTTP client: {}", e);
        reqwest::Client::new()
    })
}

/// Plain-text response with the given status.
pub fn text_response(status: StatusCode, msg: impl Into<String>) -> Response {
    (
        status,
        [(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        msg.into(),
    )
        .into_response()
}

/// Build a CORS layer from environment variables.
///
/// Environment variables:
/// - CORS_ALLOWED_ORIGINS: "*" or comma-separated origins
/// - CORS_ALLOWED_METHODS: "*" or comma-separated methods
/// - CORS_ALLOWED_HEADERS: "*" or comma-separated request header names
/// - CORS_MAX_AGE: max age in seconds (u64)
///
/// Anything unset or unparsable is permissive.
pub fn cors_layer_from_env() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

    let mut layer = CorsLayer::new();

    layer = match parse_list("CORS_ALLOWED_ORIGINS", |p| http::HeaderValue::from_str(p).ok()) {
        Some(vals) => layer.allow_origin(AllowOrigin::list(vals)),
        None => layer.allow_origin(Any),
    };
    layer = match parse_list("CORS_ALLOWED_METHODS", |p| {
        http::Method::from_bytes(p.to_ascii_uppercase().as_bytes()).ok()
    }) {
        Some(vals) => layer.allow_methods(AllowMethods::list(vals)),
        None => layer.allow_methods(Any),
    };
    layer = match parse_list("CORS_ALLOWED_HEADERS", |p| {
        http::header::HeaderName::try_from(p).ok()
    }) {
        Some(vals) => layer.allow_headers(AllowHeaders::list(vals)),
        None => layer.allow_headers(Any),
    };

    if let Ok(secs) = std::env::var("CORS_MAX_AGE") {
        if let Ok(n) = secs.trim().parse::<u64>() {
            layer = layer.max_age(std::time::Duration::from_secs(n));
        }
    }

    layer
}

/// `None` means "any": unset, "*", or nothing parsable.
fn parse_list<T>(key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let raw = std::env::var(key).ok()?;
    let raw = raw.trim();
    if raw == "*" {
        return None;
    }
    let vals: Vec<T> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(parse)
        .collect();
    if vals.is_empty() {
        None
    } else {
        Some(vals)
    }
}
