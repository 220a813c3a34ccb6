//! doctab LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `doctab-domain`.
//!
//! # Architecture
//!
//! The pipeline only ever sees one `generate(prompt, system_prompt)`
//! capability. Which hosted model answers is decided once at startup by
//! [`LlmBackend::from_config`]; nothing downstream branches on provider
//! identity. Retries with exponential backoff happen inside each call.
//!
//! # Providers
//!
//! - `OpenAiProvider`: OpenAI chat completions
//! - `GeminiProvider`: Google Gemini generateContent
//! - `MockProvider`: Deterministic mock for testing
//!
//! # Examples
//!
//! ```
//! use doctab_llm::MockProvider;
//! use doctab_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt", "system").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod gemini;
pub mod openai;
pub mod transport;

use doctab_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::info;

pub use config::{LlmConfig, ProviderKind, ProviderSettings};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Missing credentials, unknown provider or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx reply after the retry budget was spent
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code of the last attempt
        status: u16,
        /// Response body of the last attempt
        body: String,
    },

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// The configured backend, one variant per supported provider
pub enum LlmBackend {
    /// OpenAI chat completions
    OpenAi(OpenAiProvider),
    /// Google Gemini
    Gemini(GeminiProvider),
}

impl LlmBackend {
    /// Validate `config` and build the selected provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` for invalid settings or when the selected
    /// provider lacks an API key or model.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let backend = match config.provider {
            ProviderKind::OpenAi => LlmBackend::OpenAi(OpenAiProvider::from_config(config)?),
            ProviderKind::Gemini => LlmBackend::Gemini(GeminiProvider::from_config(config)?),
        };
        info!(
            "Using {} backend with model {}",
            config.provider,
            backend.model_name()
        );
        Ok(backend)
    }
}

impl LlmProviderTrait for LlmBackend {
    type Error = LlmError;

    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, Self::Error> {
        match self {
            LlmBackend::OpenAi(provider) => provider.generate(prompt, system_prompt),
            LlmBackend::Gemini(provider) => provider.generate(prompt, system_prompt),
        }
    }

    fn model_name(&self) -> &str {
        match self {
            LlmBackend::OpenAi(provider) => provider.model_name(),
            LlmBackend::Gemini(provider) => provider.model_name(),
        }
    }
}

/// Scripted reply held by the mock
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

impl MockReply {
    fn into_result(self) -> Result<String, LlmError> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(message) => Err(LlmError::Other(message)),
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Replies are chosen in this order: an exact-prompt override, then
/// the next queued reply, then the default response.
///
/// # Examples
///
/// ```
/// use doctab_llm::MockProvider;
/// use doctab_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt", "sys").unwrap(), "Fixed response");
///
/// // Queued responses, consumed in order
/// let provider = MockProvider::default();
/// provider.push_response("first");
/// provider.push_response("second");
/// assert_eq!(provider.generate("a", "sys").unwrap(), "first");
/// assert_eq!(provider.generate("b", "sys").unwrap(), "second");
/// assert_eq!(provider.generate("c", "sys").unwrap(), "Default mock response");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), MockReply::Text(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), MockReply::Error("Mock error".to_string()));
    }

    /// Queue a response for the next call without a prompt override
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.queue).push_back(MockReply::Text(response.into()));
    }

    /// Queue an error for the next call without a prompt override
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.queue).push_back(MockReply::Error(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Every `(prompt, system_prompt)` pair received so far
    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.calls).clone()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        lock(&self.calls).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, Self::Error> {
        lock(&self.calls).push((prompt.to_string(), system_prompt.to_string()));

        if let Some(reply) = lock(&self.responses).get(prompt) {
            return reply.clone().into_result();
        }

        if let Some(reply) = lock(&self.queue).pop_front() {
            return reply.into_result();
        }

        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt", "sys");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello", "sys").unwrap(), "world");
        assert_eq!(provider.generate("foo", "sys").unwrap(), "bar");
        assert_eq!(provider.generate("unknown", "sys").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_override_beats_queue() {
        let provider = MockProvider::default();
        provider.add_response("pinned", "override");
        provider.push_response("queued");

        assert_eq!(provider.generate("pinned", "sys").unwrap(), "override");
        assert_eq!(provider.generate("other", "sys").unwrap(), "queued");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1", "sys").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2", "sys").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.calls()[1], ("prompt2".to_string(), "sys".to_string()));

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.add_error("bad prompt");
        provider.push_error("queued failure");

        let result = provider.generate("bad prompt", "sys");
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));

        let result = provider.generate("anything", "sys");
        assert!(matches!(result, Err(LlmError::Other(ref m)) if m == "queued failure"));
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test", "sys").unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_backend_requires_credentials() {
        let config = LlmConfig::default();
        assert!(matches!(
            LlmBackend::from_config(&config),
            Err(LlmError::Config(_))
        ));
    }

    #[test]
    fn test_backend_selects_provider() {
        let mut config = LlmConfig::default();
        config.provider = ProviderKind::OpenAi;
        config.openai.api_key = Some("sk-test".into());
        config.openai.model = Some("gpt-test".into());

        let backend = LlmBackend::from_config(&config).unwrap();
        assert!(matches!(backend, LlmBackend::OpenAi(_)));
        assert_eq!(backend.model_name(), "gpt-test");
    }
}
