//! PDF discovery and page text extraction.

use crate::error::{CliError, Result};
use doctab_domain::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Every `*.pdf` directly inside `dir`, sorted.
///
/// The extension must be lowercase `pdf`, so no two documents share a stem.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        CliError::Config(format!("Cannot read input directory {}: {}", dir.display(), e))
    })?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "pdf");
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }

    pdfs.sort();
    Ok(pdfs)
}

/// Collapse every whitespace run into one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Page texts of a PDF, in page order.
///
/// Only the first `max_pages` pages are read when a limit is given. Page
/// text is whitespace-collapsed and pages left empty are dropped.
pub fn load_pages(path: &Path, max_pages: Option<usize>) -> Result<Vec<String>> {
    let pdf = lopdf::Document::load(path)
        .map_err(|e| CliError::Document(format!("{}: {}", path.display(), e)))?;

    let limit = max_pages.unwrap_or(usize::MAX);
    let mut pages = Vec::new();

    for page_number in pdf.get_pages().into_keys().take(limit) {
        // Pages whose content cannot be decoded count as empty
        let raw = match pdf.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!("No text on page {} of {}: {}", page_number, path.display(), e);
                continue;
            }
        };
        let text = collapse_whitespace(&raw);
        if !text.is_empty() {
            pages.push(text);
        }
    }

    Ok(pages)
}

/// Load a PDF as a pipeline document named after its file.
pub fn load_document(path: &Path, max_pages: Option<usize>) -> Result<Document> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::Document(format!("Not a file: {}", path.display())))?;
    let pages = load_pages(path, max_pages)?;
    Ok(Document::new(name, pages))
}
