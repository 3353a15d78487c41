//! Question answering over the cached dataset and raster statistics.

use std::time::Duration;

use super::provider::{ChatMessage, LlmProvider, LlmRequest};
use crate::config::LlmConfig;
use crate::error::LlmError;

/// Reply returned whenever the language model cannot be reached.
pub const APOLOGY: &str =
    "I'm sorry, I cannot access the intelligence engine right now. Please check your API Key.";

/// Longest wait between two chat attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Whether a later attempt could succeed. Throttling, upstream outages and
/// connections that never produced a status are worth another try; a
/// rejected key or request is not.
fn is_transient(error: &LlmError) -> bool {
    match error {
        LlmError::Timeout { .. } => true,
        LlmError::Request {
            status_code: Some(code),
            ..
        } => matches!(*code, 429 | 500..=599),
        LlmError::Request {
            status_code: None,
            message,
        } => ["timed out", "connect"]
            .iter()
            .any(|hint| message.contains(hint)),
        LlmError::MissingApiKey(_) => false,
    }
}

/// Pause before retry number `retry` (1-based): base, 2x base, 4x base...
fn backoff(retry: u32, base_ms: u64) -> Duration {
    let factor = 1u64
        .checked_shl(retry.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor)).min(MAX_BACKOFF)
}

/// Build the system prompt that grounds the model in the cached data.
pub fn build_system_prompt(csv_context: &str, raster_context: &str, question: &str) -> String {
    format!(
        "You are an expert Data Analyst assistant.

Current Dataset Context:
1. CSV Data Summary:
{csv_context}

2. Geospatial Raster Stats:
{raster_context}

User Question: {question}

Instructions:
- Answer based on the data provided above.
- Be concise and professional.
- If the user asks about the map, refer to the Raster Stats.
- If the user asks about trends, refer to the CSV Summary.
"
    )
}

/// Chat front end that never fails: every error path yields [`APOLOGY`].
pub struct DataAssistant {
    provider: Option<Box<dyn LlmProvider>>,
    retry_attempts: u32,
    retry_delay_ms: u64,
}

impl DataAssistant {
    pub fn new(provider: Option<Box<dyn LlmProvider>>, config: &LlmConfig) -> Self {
        Self {
            provider,
            retry_attempts: config.retry_attempts,
            retry_delay_ms: config.retry_delay_ms,
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Answer `question` using the given context strings.
    pub async fn answer(&self, csv_context: &str, raster_context: &str, question: &str) -> String {
        let Some(provider) = self.provider.as_deref() else {
            tracing::warn!("Chat requested but no LLM provider is configured");
            return APOLOGY.to_string();
        };

        let request = LlmRequest {
            messages: vec![
                ChatMessage::system(build_system_prompt(csv_context, raster_context, question)),
                ChatMessage::user(question),
            ],
        };

        for attempt in 0..=self.retry_attempts {
            if attempt > 0 {
                let delay = backoff(attempt, self.retry_delay_ms);
                tracing::debug!("Retry {attempt}/{} after {delay:?}", self.retry_attempts);
                tokio::time::sleep(delay).await;
            }

            match provider.complete(&request).await {
                Ok(response) => {
                    tracing::debug!(
                        provider = provider.name(),
                        model = %response.model,
                        latency_ms = response.latency_ms,
                        tokens = ?response.tokens_used,
                        "Chat completion"
                    );
                    return response.text;
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), "Chat completion failed: {e}");
                    if !is_transient(&e) {
                        break;
                    }
                }
            }
        }

        APOLOGY.to_string()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::error::LlmError;
    use crate::llm::provider::{LlmProvider, LlmRequest, LlmResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted provider: returns `replies` in order, repeating the last one.
    pub struct MockProvider {
        replies: Vec<Result<String, LlmError>>,
        calls: Arc<AtomicU32>,
        last_request: Arc<Mutex<Option<LlmRequest>>>,
    }

    impl MockProvider {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies,
                calls: Arc::new(AtomicU32::new(0)),
                last_request: Arc::new(Mutex::new(None)),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn calls(&self) -> Arc<AtomicU32> {
            self.calls.clone()
        }

        pub fn last_request(&self) -> Arc<Mutex<Option<LlmRequest>>> {
            self.last_request.clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            *self.last_request.lock().unwrap() = Some(request.clone());
            let reply = &self.replies[idx.min(self.replies.len() - 1)];
            match reply {
                Ok(text) => Ok(LlmResponse {
                    text: text.clone(),
                    model: "mock-v1".to_string(),
                    tokens_used: Some(42),
                    latency_ms: 1,
                }),
                Err(LlmError::Request {
                    message,
                    status_code,
                }) => Err(LlmError::Request {
                    message: message.clone(),
                    status_code: *status_code,
                }),
                Err(LlmError::Timeout { timeout_ms }) => Err(LlmError::Timeout {
                    timeout_ms: *timeout_ms,
                }),
                Err(LlmError::MissingApiKey(var)) => Err(LlmError::MissingApiKey(var.clone())),
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockProvider;
    use super::*;
    use crate::llm::provider::Role;
    use std::sync::atomic::Ordering;

    fn fast_config(retry_attempts: u32) -> LlmConfig {
        LlmConfig {
            retry_attempts,
            retry_delay_ms: 1,
            ..LlmConfig::default()
        }
    }

    fn request_error(status_code: Option<u16>, message: &str) -> LlmError {
        LlmError::Request {
            message: message.to_string(),
            status_code,
        }
    }

    #[test]
    fn test_transient_errors() {
        assert!(is_transient(&LlmError::Timeout { timeout_ms: 60_000 }));
        for code in [429, 500, 502, 503, 599] {
            assert!(is_transient(&request_error(Some(code), "upstream")), "{code}");
        }
        assert!(is_transient(&request_error(None, "error trying to connect")));
        assert!(is_transient(&request_error(None, "operation timed out")));
    }

    #[test]
    fn test_permanent_errors() {
        for code in [400, 401, 403, 404, 422] {
            assert!(!is_transient(&request_error(Some(code), "timed out")), "{code}");
        }
        assert!(!is_transient(&request_error(None, "missing field `choices`")));
        assert!(!is_transient(&LlmError::MissingApiKey("OPENAI_API_KEY".into())));
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(backoff(1, 500), Duration::from_millis(500));
        assert_eq!(backoff(2, 500), Duration::from_millis(1000));
        assert_eq!(backoff(4, 500), Duration::from_millis(4000));
        assert_eq!(backoff(8, 500), MAX_BACKOFF);
        assert_eq!(backoff(200, 500), MAX_BACKOFF);
        assert_eq!(backoff(3, 0), Duration::ZERO);
    }

    #[test]
    fn test_prompt_embeds_context_and_question() {
        let prompt = build_system_prompt("count 3", "min: 0, max: 1", "What is the trend?");
        assert!(prompt.starts_with("You are an expert Data Analyst assistant."));
        assert!(prompt.contains("1. CSV Data Summary:\ncount 3"));
        assert!(prompt.contains("2. Geospatial Raster Stats:\nmin: 0, max: 1"));
        assert!(prompt.contains("User Question: What is the trend?"));
        assert!(prompt.contains("- If the user asks about the map, refer to the Raster Stats."));
    }

    #[tokio::test]
    async fn test_answer_sends_system_and_user_messages() {
        let provider = MockProvider::replying("Values are rising.");
        let last = provider.last_request();
        let assistant = DataAssistant::new(Some(Box::new(provider)), &fast_config(0));

        let reply = assistant.answer("csv", "raster", "Trend?").await;
        assert_eq!(reply, "Values are rising.");

        let request = last.lock().unwrap().clone().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0].content.contains("csv"));
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, "Trend?");
    }

    #[tokio::test]
    async fn test_no_provider_returns_apology() {
        let assistant = DataAssistant::new(None, &fast_config(2));
        assert!(!assistant.is_available());
        assert_eq!(assistant.answer("a", "b", "c").await, APOLOGY);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let provider = MockProvider::new(vec![Err(LlmError::Request {
            message: "HTTP 401".to_string(),
            status_code: Some(401),
        })]);
        let calls = provider.calls();
        let assistant = DataAssistant::new(Some(Box::new(provider)), &fast_config(3));

        assert_eq!(assistant.answer("a", "b", "c").await, APOLOGY);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers() {
        let provider = MockProvider::new(vec![
            Err(LlmError::Request {
                message: "HTTP 429".to_string(),
                status_code: Some(429),
            }),
            Ok("Recovered.".to_string()),
        ]);
        let calls = provider.calls();
        let assistant = DataAssistant::new(Some(Box::new(provider)), &fast_config(1));

        assert_eq!(assistant.answer("a", "b", "c").await, "Recovered.");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_exhausted_returns_apology() {
        let provider = MockProvider::new(vec![Err(LlmError::Timeout { timeout_ms: 10 })]);
        let calls = provider.calls();
        let assistant = DataAssistant::new(Some(Box::new(provider)), &fast_config(2));

        assert_eq!(assistant.answer("a", "b", "c").await, APOLOGY);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
