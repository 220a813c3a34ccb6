//! doctab Extractor
//!
//! Turns page texts into one table per document using an LLM.
//!
//! # Overview
//!
//! The model is an unreliable, schema-free producer. This crate wraps it in
//! a deterministic, resumable pipeline: chunks are extracted in order, bad
//! JSON is recovered or repaired once, field names are canonicalized, chunk
//! schemas are unioned and record indices are renumbered document-wide.
//!
//! # Architecture
//!
//! ```text
//! pages → PageChunker → chunk ─┬─ ChunkCache hit ───────────────────────┐
//!                              └─ LLM → parse/repair → FieldPolicy → save ┤
//!                                                                        ↓
//!                                              SchemaMerger + renumbering → MergedResult
//! ```
//!
//! # Example Usage
//!
//! ```
//! use doctab_domain::Document;
//! use doctab_extractor::{ChunkCache, Pipeline, PipelineConfig};
//! use doctab_llm::MockProvider;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"schema": ["Name"], "records": [{"Name": "Alice"}]}"#);
//! let cache_dir = tempfile::tempdir()?;
//! let pipeline = Pipeline::new(llm, ChunkCache::new(cache_dir.path()), PipelineConfig::default())?;
//!
//! let document = Document::new("people.pdf", vec!["Name: Alice".to_string()]);
//! let outcome = pipeline.process(&document)?.expect("document has text");
//!
//! assert_eq!(outcome.result.schema, vec!["record_index", "name"]);
//! assert_eq!(outcome.stats.backend_calls, 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]

mod cache;
mod chunking;
mod config;
mod error;
mod normalize;
mod parser;
mod pipeline;
mod prompt;
mod schema;


pub use cache::ChunkCache;
pub use chunking::{PageChunker, PAGE_SEPARATOR};
pub use config::{ChunkPolicy, PipelineConfig};
pub use error::ExtractorError;
pub use normalize::{normalize_field, FieldPolicy};
pub use parser::{extract_json, parse_with_repair};
pub use pipeline::{ChunkProgress, ChunkStatus, DocumentOutcome, Pipeline, RunStats};
pub use prompt::{repair_prompt, PromptBuilder, EXTRACTION_SYSTEM_PROMPT, REPAIR_SYSTEM_PROMPT};
pub use schema::{merge_schema, SchemaMerger};
