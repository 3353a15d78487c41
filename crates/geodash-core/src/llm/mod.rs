//! LLM integration for the data chat assistant.
//!
//! Provides a provider abstraction over OpenAI-compatible chat endpoints and
//! the assistant that grounds questions in the cached CSV and raster context.

pub(crate) mod assistant;
pub(crate) mod openai;
pub(crate) mod provider;

pub use assistant::{build_system_prompt, DataAssistant, APOLOGY};
pub use provider::{ChatMessage, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse, Role};
