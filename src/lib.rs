//! Sitemap-Harvest: a filterable news-archive harvester
//!
//! This crate walks a hierarchically organized news archive (top index → year
//! index → topic/month index → article), extracts one structured record per
//! article and collects every per-item failure alongside the records, so that
//! a single malformed page never aborts the whole run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod results;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Sitemap-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlFilter, CrawlReport, TraversalEngine};
pub use results::{ArticleRecord, CrawlError, ErrorStage, ResultAggregator, Validity};
