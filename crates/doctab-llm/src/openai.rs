//! OpenAI Provider Implementation
//!
//! Talks to the chat completions endpoint with a system + user message pair.
//!
//! # Examples
//!
//! ```no_run
//! use doctab_llm::{LlmConfig, OpenAiProvider, ProviderKind};
//! use doctab_domain::traits::LlmProvider;
//!
//! let mut config = LlmConfig::default();
//! config.provider = ProviderKind::OpenAi;
//! config.openai.api_key = Some("sk-...".into());
//! config.openai.model = Some("gpt-4o-mini".into());
//!
//! let provider = OpenAiProvider::from_config(&config).unwrap();
//! let reply = provider.generate("Say hi", "You are terse.").unwrap();
//! ```

use crate::config::LlmConfig;
use crate::transport::{Auth, HttpTransport};
use crate::LlmError;
use doctab_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    transport: HttpTransport,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Build the provider from the OpenAI section of `config`
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the API key or model is missing.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let (api_key, model) = config
            .openai
            .credentials()
            .ok_or_else(|| LlmError::Config("Missing OPENAI_API_KEY or OPENAI_MODEL".to_string()))?;

        Ok(Self {
            api_base: config.openai.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature: config.temperature,
            transport: HttpTransport::new(config)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn request_body<'a>(&'a self, prompt: &'a str, system_prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }
}

/// Pull `choices[0].message.content` out of a response body
fn parse_reply(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no message content".to_string()))
}

impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, Self::Error> {
        let body = self.request_body(prompt, system_prompt);
        debug!("OpenAI request to {} ({} prompt chars)", self.model, prompt.len());
        let text = self
            .transport
            .post_json(&self.endpoint(), Auth::Bearer(&self.api_key), &body)?;
        parse_reply(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use serde_json::json;

    fn config() -> LlmConfig {
        let mut config = LlmConfig::default();
        config.provider = ProviderKind::OpenAi;
        config.temperature = 0.2;
        config.openai.api_key = Some("sk-test".into());
        config.openai.model = Some("gpt-test".into());
        config.openai.api_base = "http://localhost:8000/v1/".into();
        config
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = config();
        config.openai.model = None;
        assert!(matches!(
            OpenAiProvider::from_config(&config),
            Err(LlmError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAiProvider::from_config(&config()).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8000/v1/chat/completions");
        assert_eq!(provider.model_name(), "gpt-test");
    }

    #[test]
    fn test_request_body_shape() {
        let provider = OpenAiProvider::from_config(&config()).unwrap();
        let body = serde_json::to_value(provider.request_body("user text", "system text")).unwrap();

        assert_eq!(body["model"], json!("gpt-test"));
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "system text"}));
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "user text"}));
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_parse_reply() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "{\"a\": 1}"}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_parse_reply_without_choices() {
        assert!(matches!(
            parse_reply(r#"{"choices": []}"#),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(matches!(parse_reply("not json"), Err(LlmError::InvalidResponse(_))));
    }
}
