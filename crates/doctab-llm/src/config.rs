//! Backend configuration
//!
//! One immutable `LlmConfig` is built at startup and handed to
//! [`LlmBackend::from_config`](crate::LlmBackend::from_config). Nothing in this
//! crate reads the environment.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default OpenAI API base URL
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default Gemini API base URL
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

/// Default number of retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 2;

/// Default backoff factor (seconds)
pub const DEFAULT_RETRY_BACKOFF: f64 = 1.5;

/// Which hosted model family answers requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAi,
    /// Google Gemini generateContent
    Gemini,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::Gemini
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(LlmError::Config(format!("Unsupported LLM_PROVIDER: {}", other))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Gemini => write!(f, "gemini"),
        }
    }
}

/// Credentials and endpoint for one provider
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key; never serialized back out
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default)]
    pub model: Option<String>,

    /// Base URL without trailing slash
    pub api_base: String,
}

impl ProviderSettings {
    /// Settings pointing at `api_base` with no credentials yet
    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: None,
            api_base: api_base.into(),
        }
    }

    /// Key and model, or `None` if either is missing or blank
    pub(crate) fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        let model = self.model.as_deref().filter(|m| !m.trim().is_empty())?;
        Some((key, model))
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Configuration shared by every backend variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Selected provider
    #[serde(default)]
    pub provider: ProviderKind,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: f64,

    /// Retries after the first attempt on transient failures
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Multiplicative backoff factor (seconds)
    #[serde(default = "default_backoff")]
    pub retry_backoff: f64,

    /// OpenAI settings
    #[serde(default = "default_openai")]
    pub openai: ProviderSettings,

    /// Gemini settings
    #[serde(default = "default_gemini")]
    pub gemini: ProviderSettings,
}

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_backoff() -> f64 {
    DEFAULT_RETRY_BACKOFF
}

fn default_openai() -> ProviderSettings {
    ProviderSettings::with_base(DEFAULT_OPENAI_API_BASE)
}

fn default_gemini() -> ProviderSettings {
    ProviderSettings::with_base(DEFAULT_GEMINI_API_BASE)
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            temperature: 0.0,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            openai: default_openai(),
            gemini: default_gemini(),
        }
    }
}

impl LlmConfig {
    /// Request timeout as a Duration; out-of-range values fall back to the default
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_timeout_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }

    /// Validate numeric settings
    pub fn validate(&self) -> Result<(), LlmError> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(LlmError::Config(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        if !self.request_timeout_secs.is_finite() || self.request_timeout_secs <= 0.0 {
            return Err(LlmError::Config(format!(
                "request timeout must be greater than 0, got {}",
                self.request_timeout_secs
            )));
        }
        if !self.retry_backoff.is_finite() || self.retry_backoff < 0.0 {
            return Err(LlmError::Config(format!(
                "retry backoff must be a non-negative number, got {}",
                self.retry_backoff
            )));
        }
        Ok(())
    }
}
