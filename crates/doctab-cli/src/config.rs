//! Configuration management for the CLI.
//!
//! Settings are layered, lowest precedence first: built-in defaults, the
//! optional TOML file, environment variables, then command-line flags. clap
//! already merges the last two, so this module only fills the gaps from the
//! file and the defaults.

use crate::cli::Cli;
use crate::error::{CliError, Result};
use doctab_extractor::PipelineConfig;
use doctab_llm::config::{
    DEFAULT_GEMINI_API_BASE, DEFAULT_OPENAI_API_BASE, DEFAULT_RETRIES, DEFAULT_RETRY_BACKOFF,
    DEFAULT_TIMEOUT_SECS,
};
use doctab_llm::{LlmConfig, ProviderKind, ProviderSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default input directory
pub const DEFAULT_INPUT_DIR: &str = "input";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default cache directory
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Whether an environment-style flag value means "on".
///
/// `1`, `true`, `yes` and `y` count, case-insensitively; anything else is off.
pub fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Settings file. Keys mirror the environment variables, in lowercase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Input directory
    pub input_dir: Option<PathBuf>,
    /// Output directory
    pub output_dir: Option<PathBuf>,
    /// Cache directory
    pub cache_dir: Option<PathBuf>,
    /// Page limit per document
    pub max_pages: Option<usize>,
    /// Pages per chunk
    pub chunk_pages: Option<usize>,
    /// Character budget per chunk
    pub max_chars_per_chunk: Option<usize>,
    /// Clear caches before processing
    pub cache_reset: Option<bool>,
    /// Fields present in every record and pinned first in every schema
    pub required_fields: Option<Vec<String>>,
    /// Fields removed from every schema and record
    pub drop_fields: Option<Vec<String>>,
    /// `openai` or `gemini`
    pub llm_provider: Option<String>,
    /// Sampling temperature
    pub llm_temperature: Option<f32>,
    /// Request timeout (seconds)
    pub llm_request_timeout: Option<f64>,
    /// Retries on transient failures
    pub llm_retries: Option<u32>,
    /// Backoff factor (seconds)
    pub llm_retry_backoff: Option<f64>,
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// OpenAI model
    pub openai_model: Option<String>,
    /// OpenAI API base URL
    pub openai_api_base: Option<String>,
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// Gemini model
    pub gemini_model: Option<String>,
    /// Gemini API base URL
    pub gemini_api_base: Option<String>,
}

impl FileConfig {
    /// Load a settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Directories and limits of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Directory scanned for PDFs
    pub input_dir: PathBuf,
    /// Directory receiving outputs
    pub output_dir: PathBuf,
    /// Cache root
    pub cache_dir: PathBuf,
    /// Page limit per document
    pub max_pages: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            max_pages: None,
        }
    }
}

/// Every setting of the process, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directories and limits
    pub run: RunConfig,
    /// Backend selection and transport
    pub llm: LlmConfig,
    /// Chunking, cache and field rules
    pub pipeline: PipelineConfig,
}

impl Settings {
    /// Read the file named by `--config` (if any) and resolve.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, &file)
    }

    /// Merge flags/environment over the file over the defaults.
    pub fn resolve(cli: &Cli, file: &FileConfig) -> Result<Self> {
        let run = RunConfig {
            input_dir: pick(&cli.input_dir, &file.input_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            output_dir: pick(&cli.output_dir, &file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            cache_dir: pick(&cli.cache_dir, &file.cache_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            max_pages: pick(&cli.max_pages, &file.max_pages),
        };

        let provider = match pick(&cli.provider, &file.llm_provider) {
            Some(tag) => tag.parse::<ProviderKind>()?,
            None => ProviderKind::default(),
        };

        let llm = LlmConfig {
            provider,
            temperature: pick(&cli.temperature, &file.llm_temperature).unwrap_or(0.0),
            request_timeout_secs: pick(&cli.request_timeout, &file.llm_request_timeout)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            retries: pick(&cli.retries, &file.llm_retries).unwrap_or(DEFAULT_RETRIES),
            retry_backoff: pick(&cli.retry_backoff, &file.llm_retry_backoff)
                .unwrap_or(DEFAULT_RETRY_BACKOFF),
            openai: ProviderSettings {
                api_key: pick(&cli.openai_api_key, &file.openai_api_key),
                model: pick(&cli.openai_model, &file.openai_model),
                api_base: pick(&cli.openai_api_base, &file.openai_api_base)
                    .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            },
            gemini: ProviderSettings {
                api_key: pick(&cli.gemini_api_key, &file.gemini_api_key),
                model: pick(&cli.gemini_model, &file.gemini_model),
                api_base: pick(&cli.gemini_api_base, &file.gemini_api_base)
                    .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            },
        };
        llm.validate()?;

        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            chunk_pages: pick(&cli.chunk_pages, &file.chunk_pages),
            max_chars_per_chunk: pick(&cli.max_chars_per_chunk, &file.max_chars_per_chunk),
            cache_reset: pick(&cli.cache_reset, &file.cache_reset).unwrap_or(false),
            required_fields: file
                .required_fields
                .clone()
                .unwrap_or(defaults.required_fields),
            drop_fields: file.drop_fields.clone().unwrap_or(defaults.drop_fields),
        };
        pipeline.validate()?;

        Ok(Self { run, llm, pipeline })
    }
}

fn pick<T: Clone>(flag: &Option<T>, file: &Option<T>) -> Option<T> {
    flag.as_ref().or(file.as_ref()).cloned()
}
