//! Harvest results and their accumulation
//!
//! This module holds the values a run produces and the single place they are
//! collected while article workers run concurrently.
//!
//! # Components
//!
//! - `ArticleRecord`: One successfully extracted article
//! - `CrawlError`: One recorded failure, tagged with the stage it happened in
//! - `Validity` / `ErrorStage`: Classification enums for the two
//! - `ResultAggregator`: Thread-safe collection point drained at the end of a run

mod aggregator;
mod kinds;
mod record;

// Re-export main types
pub use aggregator::ResultAggregator;
pub use kinds::{ErrorStage, Validity};
pub use record::{ArticleRecord, CrawlError};
