//! Source documents as seen by the pipeline

use std::path::Path;

/// A document ready for extraction: a stable name plus its page texts.
///
/// Pages are kept in source order. Empty pages are dropped on construction
/// so every entry carries text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    stem: String,
    pages: Vec<String>,
}

impl Document {
    /// Create a document from its file name and page texts.
    ///
    /// # Examples
    ///
    /// ```
    /// use doctab_domain::Document;
    ///
    /// let doc = Document::new("invoices.pdf", vec!["page one".into(), "".into()]);
    /// assert_eq!(doc.stem(), "invoices");
    /// assert_eq!(doc.pages().len(), 1);
    /// ```
    pub fn new(name: impl Into<String>, pages: Vec<String>) -> Self {
        let name = name.into();
        let stem = Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());

        Self {
            name,
            stem,
            pages: pages.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// File name of the document, used in prompts
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File stem, used to address cache and output files
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Non-empty page texts in source order
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// True when the document has no text at all
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
