//! Page chunking for large documents

use crate::config::ChunkPolicy;

/// Separator placed between pages inside one chunk
pub const PAGE_SEPARATOR: &str = "\n";

/// Groups page texts into chunks according to the configured policy
///
/// Splitting is pure: the same pages and policy always produce the same
/// chunks, in page order. Empty pages are skipped and an input without text
/// yields no chunks.
pub struct PageChunker {
    policy: ChunkPolicy,
}

impl PageChunker {
    /// Create a new page chunker
    pub fn new(policy: ChunkPolicy) -> Self {
        Self { policy }
    }

    /// Split the given pages into chunk texts
    pub fn split<S: AsRef<str>>(&self, pages: &[S]) -> Vec<String> {
        let pages: Vec<&str> = pages
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| !p.is_empty())
            .collect();

        if pages.is_empty() {
            return Vec::new();
        }

        match self.policy {
            ChunkPolicy::ByPages(n) if n > 0 => Self::split_by_pages(&pages, n),
            ChunkPolicy::ByChars(c) if c > 0 => Self::split_by_chars(&pages, c),
            _ => vec![pages.join(PAGE_SEPARATOR)],
        }
    }

    /// Consecutive groups of up to `n` pages
    fn split_by_pages(pages: &[&str], n: usize) -> Vec<String> {
        pages
            .chunks(n)
            .map(|group| group.join(PAGE_SEPARATOR))
            .collect()
    }

    /// Greedy packing: flush before a page that would push the buffer past `max_chars`.
    ///
    /// Each page counts its length plus one for the separator. A single page
    /// longer than the budget still becomes its own chunk.
    fn split_by_chars(pages: &[&str], max_chars: usize) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        let mut current = 0;

        for page in pages {
            let page_len = page.chars().count() + 1;
            if !buffer.is_empty() && current + page_len > max_chars {
                chunks.push(buffer.join(PAGE_SEPARATOR));
                buffer.clear();
                current = 0;
            }
            buffer.push(page);
            current += page_len;
        }

        if !buffer.is_empty() {
            chunks.push(buffer.join(PAGE_SEPARATOR));
        }

        chunks
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn policy() -> impl Strategy<Value = ChunkPolicy> {
        prop_oneof![
            Just(ChunkPolicy::Whole),
            (0usize..6).prop_map(ChunkPolicy::ByPages),
            (0usize..60).prop_map(ChunkPolicy::ByChars),
        ]
    }

    proptest! {
        /// Property: joining the chunks in order gives back the joined pages
        #[test]
        fn test_chunks_reconstruct_pages(
            pages in prop::collection::vec("[a-z ]{1,20}", 0..12),
            policy in policy(),
        ) {
            let chunks = PageChunker::new(policy).split(&pages);
            prop_assert_eq!(chunks.join(PAGE_SEPARATOR), pages.join(PAGE_SEPARATOR));
        }

        /// Property: page budgets are never exceeded
        #[test]
        fn test_page_budget_respected(
            pages in prop::collection::vec("[a-z]{1,5}", 1..20),
            n in 1usize..5,
        ) {
            let chunks = PageChunker::new(ChunkPolicy::ByPages(n)).split(&pages);
            prop_assert_eq!(chunks.len(), pages.len().div_ceil(n));
            for chunk in &chunks {
                prop_assert!(chunk.split(PAGE_SEPARATOR).count() <= n);
            }
        }
    }
}
