//! HTTP fetcher implementation
//!
//! This module handles every HTTP request the harvester makes:
//! - Building the HTTP client with the configured user agent and timeouts
//! - One GET per URL, no retries
//! - Error classification into `FetchError`

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Why a page could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl FetchError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_redirect() {
            Self::TooManyRedirects
        } else if let Some(status) = error.status() {
            Self::HttpStatus(status.as_u16())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Timeouts and redirect limit
///
/// # Example
///
/// ```no_run
/// use sitemap_harvest::config::{CrawlerConfig, UserAgentConfig};
/// use sitemap_harvest::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "SitemapHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Stateless page retriever shared by the traversal and every article worker
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, crawler)?))
    }

    /// Performs one GET and returns the body as text
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Deadline exceeded | `Timeout` |
    /// | Redirect chain over the limit | `TooManyRedirects` |
    /// | Non-2xx status | `HttpStatus(code)` |
    /// | Anything else (DNS, TLS, reset, body decode) | `Transport` |
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response.text().await.map_err(FetchError::from_reqwest)
    }
}
