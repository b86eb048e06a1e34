//! Answer gateway: chat-completion client for OpenAI-compatible endpoints.

mod client;

pub use client::{LlmClient, LlmError, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};
