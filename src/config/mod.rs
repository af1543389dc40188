//! Configuration module for Sitemap-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Sampling every {} article(s)", config.filter.sampling_stride);
//! ```

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{
    ArchiveConfig, Config, CrawlerConfig, FilterConfig, OutputConfig, SelectorConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
