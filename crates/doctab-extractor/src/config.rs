//! Configuration for the Pipeline

use crate::error::ExtractorError;
use crate::normalize::normalize_field;
use doctab_domain::RECORD_INDEX;
use serde::{Deserialize, Serialize};

/// How pages are grouped into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPolicy {
    /// Up to `n` pages per chunk
    ByPages(usize),
    /// Greedily pack pages while the chunk stays within `n` characters
    ByChars(usize),
    /// One chunk holding the whole document
    Whole,
}

/// Configuration for the Pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pages per chunk; takes priority over the character budget when > 0
    #[serde(default)]
    pub chunk_pages: Option<usize>,

    /// Character budget per chunk, used when `chunk_pages` is unset
    #[serde(default)]
    pub max_chars_per_chunk: Option<usize>,

    /// Delete each document's cache before processing it
    #[serde(default)]
    pub cache_reset: bool,

    /// Fields pinned to the front of every schema and present in every record
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,

    /// Fields removed from every schema and record (matched lowercase)
    #[serde(default = "default_drop_fields")]
    pub drop_fields: Vec<String>,
}

fn default_required_fields() -> Vec<String> {
    vec![RECORD_INDEX.to_string()]
}

fn default_drop_fields() -> Vec<String> {
    vec!["document_name".to_string()]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_pages: None,
            max_chars_per_chunk: None,
            cache_reset: false,
            required_fields: default_required_fields(),
            drop_fields: default_drop_fields(),
        }
    }
}

impl PipelineConfig {
    /// Chunking policy implied by the budgets; page count wins over characters
    pub fn chunk_policy(&self) -> ChunkPolicy {
        match (self.chunk_pages, self.max_chars_per_chunk) {
            (Some(pages), _) if pages > 0 => ChunkPolicy::ByPages(pages),
            (_, Some(chars)) if chars > 0 => ChunkPolicy::ByChars(chars),
            _ => ChunkPolicy::Whole,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if !self.required_fields.iter().any(|f| f == RECORD_INDEX) {
            return Err(ExtractorError::Config(format!(
                "required_fields must include '{}'",
                RECORD_INDEX
            )));
        }
        for field in &self.required_fields {
            if normalize_field(field) != *field {
                return Err(ExtractorError::Config(format!(
                    "required field '{}' is not a normalized identifier",
                    field
                )));
            }
            if self.drop_fields.iter().any(|d| d.trim().to_lowercase() == *field) {
                return Err(ExtractorError::Config(format!(
                    "field '{}' is both required and dropped",
                    field
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_policy(), ChunkPolicy::Whole);
    }

    #[test]
    fn test_page_budget_wins() {
        let config = PipelineConfig {
            chunk_pages: Some(3),
            max_chars_per_chunk: Some(1000),
            ..PipelineConfig::default()
        };
        assert_eq!(config.chunk_policy(), ChunkPolicy::ByPages(3));
    }

    #[test]
    fn test_zero_page_budget_falls_through_to_chars() {
        let config = PipelineConfig {
            chunk_pages: Some(0),
            max_chars_per_chunk: Some(500),
            ..PipelineConfig::default()
        };
        assert_eq!(config.chunk_policy(), ChunkPolicy::ByChars(500));
    }

    #[test]
    fn test_missing_record_index_rejected() {
        let config = PipelineConfig {
            required_fields: vec!["id".into()],
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_unnormalized_required_field_rejected() {
        let config = PipelineConfig {
            required_fields: vec!["record_index".into(), "Invoice No".into()],
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_required_and_dropped_rejected() {
        let config = PipelineConfig {
            drop_fields: vec!["Record_Index".into()],
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig {
            chunk_pages: Some(2),
            cache_reset: true,
            ..PipelineConfig::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_toml_defaults() {
        let parsed = PipelineConfig::from_toml("max_chars_per_chunk = 8000\n").unwrap();
        assert_eq!(parsed.chunk_policy(), ChunkPolicy::ByChars(8000));
        assert_eq!(parsed.required_fields, vec!["record_index".to_string()]);
        assert_eq!(parsed.drop_fields, vec!["document_name".to_string()]);
    }
}
