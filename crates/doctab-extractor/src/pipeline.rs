//! Document pipeline: chunk, extract, cache, merge

use crate::cache::ChunkCache;
use crate::chunking::PageChunker;
use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use crate::normalize::FieldPolicy;
use crate::parser::parse_with_repair;
use crate::prompt::{repair_prompt, PromptBuilder, EXTRACTION_SYSTEM_PROMPT, REPAIR_SYSTEM_PROMPT};
use crate::schema::SchemaMerger;
use doctab_domain::traits::LlmProvider;
use doctab_domain::{backfill, Document, ExtractionResult, MergedResult, Record, RECORD_INDEX};
use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, info};

/// Counters collected while processing one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Chunks the document was split into
    pub chunks: usize,
    /// Chunks answered from the cache
    pub cache_hits: usize,
    /// Calls made to the backend, repair calls included
    pub backend_calls: usize,
}

/// Where a chunk's result is coming from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// Loaded from the cache
    Cached,
    /// Sent to the backend
    Running,
}

/// Progress notification, emitted once per chunk before it is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    /// 1-based chunk position
    pub position: usize,
    /// Total chunks in the document
    pub total: usize,
    /// Cache hit or backend call
    pub status: ChunkStatus,
}

/// Merged table of one document plus run counters
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutcome {
    /// Document-level schema and records
    pub result: MergedResult,
    /// What it took to build them
    pub stats: RunStats,
}

/// Turns documents into merged tables, one chunk at a time.
///
/// Chunks are handled strictly in order. Every successfully extracted chunk
/// is cached before the next one starts, so a failed run resumes where it
/// stopped.
pub struct Pipeline<L>
where
    L: LlmProvider,
{
    llm: L,
    cache: ChunkCache,
    config: PipelineConfig,
    policy: FieldPolicy,
}

impl<L> Pipeline<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a pipeline
    ///
    /// # Errors
    ///
    /// `ExtractorError::Config` when `config` does not validate.
    pub fn new(llm: L, cache: ChunkCache, config: PipelineConfig) -> Result<Self, ExtractorError> {
        config.validate()?;
        let policy = FieldPolicy::from_config(&config);
        Ok(Self {
            llm,
            cache,
            config,
            policy,
        })
    }

    /// Chunk cache
    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// Process one document.
    ///
    /// Returns `Ok(None)` when the document holds no text, which callers
    /// report as skipped.
    pub fn process(&self, document: &Document) -> Result<Option<DocumentOutcome>, ExtractorError> {
        self.process_with_progress(document, |_| {})
    }

    /// Process one document, reporting each chunk to `on_chunk`
    pub fn process_with_progress<F>(
        &self,
        document: &Document,
        mut on_chunk: F,
    ) -> Result<Option<DocumentOutcome>, ExtractorError>
    where
        F: FnMut(ChunkProgress),
    {
        let chunks = PageChunker::new(self.config.chunk_policy()).split(document.pages());
        if chunks.is_empty() {
            info!("No text extracted from {}; skipping", document.name());
            return Ok(None);
        }

        if self.config.cache_reset {
            self.cache.reset(document.stem())?;
        }

        let total = chunks.len();
        let mut stats = RunStats {
            chunks: total,
            ..RunStats::default()
        };
        let mut merger = SchemaMerger::new(self.policy.required().to_vec());
        let mut records: Vec<Record> = Vec::new();
        let mut next_index: u64 = 1;

        info!(
            "Processing {} ({} chunk(s), model {})",
            document.name(),
            total,
            self.llm.model_name()
        );

        for (idx, chunk) in chunks.iter().enumerate() {
            let position = idx + 1;

            let chunk_result = match self.cache.load(document.stem(), position) {
                Some(cached) => {
                    on_chunk(ChunkProgress {
                        position,
                        total,
                        status: ChunkStatus::Cached,
                    });
                    stats.cache_hits += 1;
                    debug!("Chunk {}/{} loaded from cache", position, total);
                    cached
                }
                None => {
                    on_chunk(ChunkProgress {
                        position,
                        total,
                        status: ChunkStatus::Running,
                    });
                    let fresh = self.extract_chunk(document, chunk, &mut stats)?;
                    self.cache.save(document.stem(), position, &fresh)?;
                    debug!(
                        "Chunk {}/{} extracted: {} record(s)",
                        position,
                        total,
                        fresh.records.len()
                    );
                    fresh
                }
            };

            merger.merge(&chunk_result.schema);
            for mut record in chunk_result.records {
                record.insert(RECORD_INDEX.to_string(), Value::from(next_index));
                next_index += 1;
                records.push(record);
            }
        }

        let schema = merger.into_schema();
        backfill(&mut records, &schema);

        info!(
            "Finished {}: {} record(s), {} field(s), {} cache hit(s)",
            document.name(),
            records.len(),
            schema.len(),
            stats.cache_hits
        );

        Ok(Some(DocumentOutcome {
            result: MergedResult { schema, records },
            stats,
        }))
    }

    /// Backend call, parse (with at most one repair) and normalize
    fn extract_chunk(
        &self,
        document: &Document,
        chunk: &str,
        stats: &mut RunStats,
    ) -> Result<ExtractionResult, ExtractorError> {
        let prompt = PromptBuilder::new(chunk.to_string(), document.name().to_string())
            .with_required_fields(self.policy.required().to_vec())
            .build();

        debug!("Prompt length: {} chars", prompt.len());

        let response = self.call_llm(&prompt, EXTRACTION_SYSTEM_PROMPT, stats)?;

        debug!("LLM response length: {} chars", response.len());

        let data = parse_with_repair(&response, |bad| {
            self.call_llm(&repair_prompt(bad), REPAIR_SYSTEM_PROMPT, stats)
        })?;

        self.policy.normalize_response(data)
    }

    fn call_llm(
        &self,
        prompt: &str,
        system_prompt: &str,
        stats: &mut RunStats,
    ) -> Result<String, ExtractorError> {
        stats.backend_calls += 1;
        self.llm
            .generate(prompt, system_prompt)
            .map_err(|e| ExtractorError::Llm(e.to_string()))
    }
}
