//! doctab Domain Layer
//!
//! Plain data model shared by every other crate in the workspace. Nothing in
//! here performs I/O; the traits at the bottom mark the seams where
//! infrastructure crates plug in.
//!
//! ## Key Concepts
//!
//! - **Document**: a named, ordered sequence of page texts
//! - **Record**: one row of extracted data, a field → JSON value map
//! - **ExtractionResult**: schema + records inferred from a single chunk
//! - **MergedResult**: the document-level table after all chunks are reconciled

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use document::Document;
pub use record::{backfill, ExtractionResult, MergedResult, Record, RECORD_INDEX};
