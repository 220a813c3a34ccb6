//! Batch processing of an input directory.

use crate::config::RunConfig;
use crate::error::Result;
use crate::output::{write_json, write_xlsx};
use crate::source::{discover_pdfs, load_document};
use doctab_domain::traits::LlmProvider;
use doctab_domain::{Document, MergedResult};
use doctab_extractor::{ChunkProgress, ChunkStatus, Pipeline};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Outputs written
    Ok,
    /// No text to extract
    Skipped,
    /// Aborted; earlier chunks stay cached
    Failed(String),
}

/// One row of the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    /// File name
    pub name: String,
    /// Chunks the document was split into
    pub chunks: usize,
    /// Chunks answered from the cache
    pub cached: usize,
    /// Records in the merged table
    pub records: usize,
    /// Fields in the merged schema
    pub fields: usize,
    /// Final status
    pub status: DocumentStatus,
}

impl DocumentReport {
    fn empty(name: &str, status: DocumentStatus) -> Self {
        Self {
            name: name.to_string(),
            chunks: 0,
            cached: 0,
            records: 0,
            fields: 0,
            status,
        }
    }
}

/// Process every PDF of the input directory, one at a time.
///
/// Only an unreadable input directory is an error; per-document failures
/// are logged and reported.
pub fn run_batch<L>(
    pipeline: &Pipeline<L>,
    run: &RunConfig,
    show_progress: bool,
) -> Result<Vec<DocumentReport>>
where
    L: LlmProvider,
    L::Error: Display,
{
    let pdfs = discover_pdfs(&run.input_dir)?;
    info!("Found {} PDF file(s) in {}", pdfs.len(), run.input_dir.display());

    let mut reports = Vec::with_capacity(pdfs.len());
    for path in &pdfs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let report = match load_document(path, run.max_pages) {
            Ok(document) => {
                info!(
                    "Extracted {} text page(s) from {}",
                    document.pages().len(),
                    document.name()
                );
                process_document(pipeline, &document, &run.output_dir, show_progress)
            }
            Err(e) => {
                warn!("Failed to read {}: {}", name, e);
                DocumentReport::empty(&name, DocumentStatus::Failed(e.to_string()))
            }
        };
        reports.push(report);
    }

    Ok(reports)
}

/// Run one document through the pipeline and write its outputs.
pub fn process_document<L>(
    pipeline: &Pipeline<L>,
    document: &Document,
    output_dir: &Path,
    show_progress: bool,
) -> DocumentReport
where
    L: LlmProvider,
    L::Error: Display,
{
    let bar = if show_progress {
        progress_bar(document.name())
    } else {
        ProgressBar::hidden()
    };

    let outcome = pipeline.process_with_progress(document, |progress: ChunkProgress| {
        bar.set_length(progress.total as u64);
        bar.set_position((progress.position - 1) as u64);
        bar.set_message(match progress.status {
            ChunkStatus::Cached => "cached",
            ChunkStatus::Running => "running",
        });
    });
    bar.finish_and_clear();

    let outcome = match outcome {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return DocumentReport::empty(document.name(), DocumentStatus::Skipped),
        Err(e) => {
            warn!("Aborted {}: {}", document.name(), e);
            return DocumentReport::empty(document.name(), DocumentStatus::Failed(e.to_string()));
        }
    };

    let status = match write_outputs(output_dir, document.stem(), &outcome.result) {
        Ok(_) => {
            info!(
                "Completed {}: {} record(s)",
                document.name(),
                outcome.result.len()
            );
            DocumentStatus::Ok
        }
        Err(e) => {
            warn!("Could not write outputs for {}: {}", document.name(), e);
            DocumentStatus::Failed(e.to_string())
        }
    };

    DocumentReport {
        name: document.name().to_string(),
        chunks: outcome.stats.chunks,
        cached: outcome.stats.cache_hits,
        records: outcome.result.len(),
        fields: outcome.result.schema.len(),
        status,
    }
}

/// Write both outputs of a document, or neither.
fn write_outputs(output_dir: &Path, stem: &str, result: &MergedResult) -> Result<()> {
    let json_path = write_json(output_dir, stem, result)?;
    if let Err(e) = write_xlsx(output_dir, stem, result) {
        match fs::remove_file(&json_path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("Could not remove {}: {}", json_path.display(), err),
        }
        return Err(e);
    }
    Ok(())
}

/// Process exit code for a finished batch: 2 when every document failed.
pub fn exit_code(reports: &[DocumentReport]) -> i32 {
    let all_failed = !reports.is_empty()
        && reports
            .iter()
            .all(|r| matches!(r.status, DocumentStatus::Failed(_)));
    if all_failed {
        2
    } else {
        0
    }
}

fn progress_bar(name: &str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("  {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_prefix(name.to_string());
    bar.set_draw_target(ProgressDrawTarget::stderr());
    bar
}
