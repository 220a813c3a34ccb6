//! Gemini Provider Implementation
//!
//! Gemini's generateContent API has no separate system role in the shape we
//! use, so the system prompt is prepended to the user text.

use crate::config::LlmConfig;
use crate::transport::{Auth, HttpTransport};
use crate::LlmError;
use doctab_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Google Gemini generateContent provider
pub struct GeminiProvider {
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    transport: HttpTransport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part; 1],
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GeminiProvider {
    /// Build the provider from the Gemini section of `config`
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the API key or model is missing.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let (api_key, model) = config
            .gemini
            .credentials()
            .ok_or_else(|| LlmError::Config("Missing GEMINI_API_KEY or GEMINI_MODEL".to_string()))?;

        Ok(Self {
            api_base: config.gemini.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature: config.temperature,
            transport: HttpTransport::new(config)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn request_body(&self, prompt: &str, system_prompt: &str) -> GenerateRequest<'static> {
        GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: Some(format!("{}\n\n{}", system_prompt, prompt)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
fn parse_reply(body: &str) -> Result<String, LlmError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no candidate text".to_string()))
}

impl LlmProviderTrait for GeminiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, Self::Error> {
        let body = self.request_body(prompt, system_prompt);
        debug!("Gemini request to {} ({} prompt chars)", self.model, prompt.len());
        let text = self
            .transport
            .post_json(&self.endpoint(), Auth::QueryKey(&self.api_key), &body)?;
        parse_reply(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
