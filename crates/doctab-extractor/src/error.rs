//! Error types for the Extractor

use thiserror::Error;

/// Errors that abort extraction of the current document
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error (transport, HTTP status, credentials)
    #[error("LLM error: {0}")]
    Llm(String),

    /// No JSON could be recovered from the model output, even after repair
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// JSON parsed but is not a list, a records object or a plain object
    #[error("Unexpected JSON shape: {0}")]
    Shape(String),

    /// Cache directory could not be written or cleared
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::Parse(e.to_string())
    }
}
