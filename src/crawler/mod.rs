//! Crawler module for archive traversal and article extraction
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with typed failures
//! - Index page parsing at the top, year and topic-month levels
//! - Article extraction and length policy
//! - Filtering before any fetch
//! - Bounded concurrent article dispatch
//! - Overall traversal coordination

mod coordinator;
mod dispatcher;
mod extractor;
mod fetcher;
mod filter;
mod parser;

pub use coordinator::{run_harvest, CrawlReport, TraversalEngine};
pub use dispatcher::{ArticleDispatcher, DispatchSummary};
pub use extractor::{ArticleContext, ArticleExtractor, ExtractError, ExtractedArticle};
pub use fetcher::{build_http_client, FetchError, PageFetcher};
pub use filter::CrawlFilter;
pub use parser::{
    ArticleEntry, IndexParser, ParseError, RejectedEntry, TopicMonthEntry, TopicMonthIndex,
    YearEntry,
};
