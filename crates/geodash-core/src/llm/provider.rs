//! LLM provider trait and request/response types.
//!
//! Defines the interface chat backends implement, plus the factory that
//! creates the configured provider.

use crate::config::LlmConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Conversation role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<ChatMessage>,
}

/// The response from an LLM completion call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated reply text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai").
    fn name(&self) -> &str;

    /// Generate a reply for the given conversation.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the chat provider from config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an OpenAI-compatible provider from the `[llm]` config section.
    ///
    /// Fails with [`LlmError::MissingApiKey`] when the key (or the env var it
    /// points at) is empty.
    pub fn create(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
        let api_key = resolve_env_var(&config.api_key).ok_or_else(|| {
            let var = config
                .api_key
                .strip_prefix("${")
                .and_then(|v| v.strip_suffix('}'))
                .unwrap_or("OPENAI_API_KEY");
            LlmError::MissingApiKey(var.to_string())
        })?;

        Ok(Box::new(super::openai::OpenAiProvider::new(
            &config.endpoint,
            &api_key,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )))
    }
}
