#![forbid(unsafe_code)]
#![doc = r#"
text2cypher

Turn a natural-language question about a graph into a Cypher query by asking an
OpenAI-compatible Chat Completions endpoint.

Crate highlights
- HTTP server (in `server`): `POST /convert`, `GET /check-key`, `GET /status`.
- Client (in `client`): `CompletionClient` trait and the reqwest-backed `OpenAiClient`.
- Pacing (in `rate_limit`) and per-step hooks (in `observer`) are injectable.

Modules
- `models`: inbound `/convert` bodies and the Chat Completions wire subset.
- `prompt`: built-in Cypher instructions and prompt assembly.
- `system_prompt_config`: optional JSON override for the instructions.
- `config`: environment-driven `AppConfig` and the redacted `ApiCredential`.
- `error`: `CompletionError` taxonomy.
- `util`: tracing/env bootstrap, HTTP client, CORS and response helpers.
"#]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod observer;
pub mod prompt;
pub mod rate_limit;
pub mod server;
pub mod system_prompt_config;
pub mod util;

pub use crate::client::{CompletionClient, OpenAiClient};
pub use crate::config::{ApiCredential, AppConfig};
pub use crate::error::CompletionError;
pub use crate::prompt::{Prompt, PromptTemplate};
pub use crate::server::{build_router, AppState};
