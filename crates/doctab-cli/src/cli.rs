//! Command-line arguments.
//!
//! Every option can also be set through the environment variable named in
//! its help text; an explicit flag wins over the variable.

use crate::config::truthy;
use clap::Parser;
use std::path::PathBuf;

/// doctab - Turn PDF documents into tables with an LLM.
#[derive(Debug, Default, Parser)]
#[command(name = "doctab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory scanned for *.pdf files
    #[arg(short, long, env = "DOCTAB_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving {stem}.json and {stem}.xlsx
    #[arg(short, long, env = "DOCTAB_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding per-chunk cache entries
    #[arg(long, env = "DOCTAB_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Read at most this many pages per document
    #[arg(long, env = "MAX_PAGES")]
    pub max_pages: Option<usize>,

    /// Pages per chunk (takes priority over --max-chars-per-chunk)
    #[arg(long, env = "CHUNK_PAGES", allow_negative_numbers = true, value_parser = parse_chunk_size)]
    pub chunk_pages: Option<usize>,

    /// Character budget per chunk
    #[arg(long, env = "MAX_CHARS_PER_CHUNK", allow_negative_numbers = true, value_parser = parse_chunk_size)]
    pub max_chars_per_chunk: Option<usize>,

    /// Clear each document's cache before processing it
    #[arg(
        long,
        env = "CACHE_RESET",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_flag
    )]
    pub cache_reset: Option<bool>,

    /// LLM provider (openai or gemini)
    #[arg(long, env = "LLM_PROVIDER")]
    pub provider: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "LLM_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds
    #[arg(long, env = "LLM_REQUEST_TIMEOUT")]
    pub request_timeout: Option<f64>,

    /// Retries on transient HTTP failures
    #[arg(long, env = "LLM_RETRIES")]
    pub retries: Option<u32>,

    /// Backoff factor in seconds between retries
    #[arg(long, env = "LLM_RETRY_BACKOFF")]
    pub retry_backoff: Option<f64>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// OpenAI model
    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    pub openai_api_base: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model
    #[arg(long, env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_API_BASE")]
    pub gemini_api_base: Option<String>,

    /// Hide per-document progress bars
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(truthy(value))
}

/// Chunk budgets of zero or less mean "no limit" and map to 0
fn parse_chunk_size(value: &str) -> Result<usize, String> {
    let n: i64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number", value))?;
    Ok(usize::try_from(n).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["doctab", "--input-dir", "pdfs"]).unwrap();
        assert_eq!(cli.input_dir, Some(PathBuf::from("pdfs")));
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cache_reset_forms() {
        let cli = Cli::try_parse_from(["doctab", "--cache-reset"]).unwrap();
        assert_eq!(cli.cache_reset, Some(true));

        let cli = Cli::try_parse_from(["doctab", "--cache-reset", "YES"]).unwrap();
        assert_eq!(cli.cache_reset, Some(true));

        let cli = Cli::try_parse_from(["doctab", "--cache-reset=off"]).unwrap();
        assert_eq!(cli.cache_reset, Some(false));
    }

    #[test]
    fn test_numeric_options() {
        let cli = Cli::try_parse_from([
            "doctab",
            "--chunk-pages",
            "2",
            "--max-chars-per-chunk",
            "8000",
            "--retries",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.chunk_pages, Some(2));
        assert_eq!(cli.max_chars_per_chunk, Some(8000));
        assert_eq!(cli.retries, Some(5));
    }

    #[test]
    fn test_non_positive_chunk_budgets_mean_unset() {
        let cli = Cli::try_parse_from([
            "doctab",
            "--chunk-pages",
            "-1",
            "--max-chars-per-chunk=0",
        ])
        .unwrap();
        assert_eq!(cli.chunk_pages, Some(0));
        assert_eq!(cli.max_chars_per_chunk, Some(0));

        assert!(Cli::try_parse_from(["doctab", "--chunk-pages", "two"]).is_err());
    }

    #[test]
    fn test_rejects_bad_number() {
        assert!(Cli::try_parse_from(["doctab", "--max-pages", "many"]).is_err());
    }
}
