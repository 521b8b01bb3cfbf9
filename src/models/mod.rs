//! Data models for the service.
//!
//! This module groups two submodules:
//! - `chat`: the subset of the OpenAI Chat Completions wire format sent and read upstream.
//! - `convert`: the inbound `/convert` request and its success/error bodies.

pub mod chat;
pub mod convert;

pub use chat::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Role};
pub use convert::{ConversionRequest, ConversionResponse, ErrorBody, CONVERSION_FAILED};
