//! Startup configuration read from the environment.
//!
//! Environment:
//! - OPENAI_API_KEY                       -> bearer credential (optional; absence is logged)
//! - OPENAI_API_URL                       -> Chat Completions endpoint
//! - OPENAI_MODEL                         -> model identifier
//! - TEXT2CYPHER_TEMPERATURE              -> sampling temperature (f32)
//! - TEXT2CYPHER_HTTP_TIMEOUT_SECONDS     -> per-request upstream timeout (u64)
//! - TEXT2CYPHER_PRE_CALL_DELAY_MS        -> flat delay before each upstream call (u64, 0 disables)
//! - BIND_ADDR                            -> listen address

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-16k";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_PRE_CALL_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5004";

/// Secret used as the upstream bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Blank values count as absent.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Character count, as reported by `/check-key`.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiCredential(<redacted, {} chars>)", self.len())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<ApiCredential>,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub pre_call_delay: Duration,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            pre_call_delay: DEFAULT_PRE_CALL_DELAY,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unparsable values
    /// are logged and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = lookup("OPENAI_API_KEY").and_then(ApiCredential::new);
        let api_url = non_empty("OPENAI_API_URL").unwrap_or(defaults.api_url);
        let model = non_empty("OPENAI_MODEL").unwrap_or(defaults.model);
        let bind_addr = non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let temperature = parse_or_default(
            "TEXT2CYPHER_TEMPERATURE",
            non_empty("TEXT2CYPHER_TEMPERATURE"),
            defaults.temperature,
        );
        let timeout = match parse_or_default(
            "TEXT2CYPHER_HTTP_TIMEOUT_SECONDS",
            non_empty("TEXT2CYPHER_HTTP_TIMEOUT_SECONDS"),
            defaults.timeout.as_secs(),
        ) {
            0 => {
                tracing::warn!("TEXT2CYPHER_HTTP_TIMEOUT_SECONDS must be positive; using default");
                defaults.timeout
            }
            secs => Duration::from_secs(secs),
        };
        let pre_call_delay = Duration::from_millis(parse_or_default(
            "TEXT2CYPHER_PRE_CALL_DELAY_MS",
            non_empty("TEXT2CYPHER_PRE_CALL_DELAY_MS"),
            defaults.pre_call_delay.as_millis() as u64,
        ));

        Self {
            api_key,
            api_url,
            model,
            temperature,
            timeout,
            pre_call_delay,
            bind_addr,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = ApiCredential::new(key);
        self
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or_default<T>(key: &'static str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => parse_value(key, &raw).unwrap_or_else(|e| {
            tracing::warn!("{}; using default", e);
            default
        }),
    }
}
