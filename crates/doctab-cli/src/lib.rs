//! doctab CLI library.
//!
//! Configuration resolution, PDF input, batch processing and output writers
//! behind the `doctab` binary.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod source;

pub use batch::{exit_code, process_document, run_batch, DocumentReport, DocumentStatus};
pub use cli::Cli;
pub use config::{FileConfig, RunConfig, Settings};
pub use error::{CliError, Result};
pub use output::Formatter;
