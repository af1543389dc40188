//! Record sink trait and output errors
//!
//! Every persistence target receives the drained results of a run through
//! the same three calls, in order: records, errors, then finalize.

use crate::output::stats::RunSummary;
use crate::results::{ArticleRecord, CrawlError};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A destination for the results of one run
pub trait RecordSink {
    /// Persists article records
    ///
    /// Records may arrive in any order; sinks that care about order sort
    /// by sequence number themselves.
    fn write_records(&mut self, records: &[ArticleRecord]) -> OutputResult<()>;

    /// Persists recorded failures
    fn write_errors(&mut self, errors: &[CrawlError]) -> OutputResult<()>;

    /// Flushes buffers and stores the run summary where supported
    fn finalize(&mut self, summary: &RunSummary) -> OutputResult<()>;
}
