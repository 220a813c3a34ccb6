//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend configuration or call failure
    #[error(transparent)]
    Llm(#[from] doctab_llm::LlmError),

    /// Pipeline failure
    #[error(transparent)]
    Extractor(#[from] doctab_extractor::ExtractorError),

    /// PDF could not be read
    #[error("Document error: {0}")]
    Document(String),

    /// Output file could not be written
    #[error("Output error: {0}")]
    Output(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
