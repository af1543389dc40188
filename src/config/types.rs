use serde::Deserialize;

/// Main configuration structure for Sitemap-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Where the archive lives and how its records are labelled
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Base URL that relative index links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// URL of the top-level index listing every year
    #[serde(rename = "top-index-url")]
    pub top_index_url: String,

    /// Publisher name written on every record
    #[serde(default = "default_publisher")]
    pub publisher: String,

    /// Bias score written on every record
    #[serde(default)]
    pub bias: i32,
}

/// Which parts of the archive to harvest
///
/// Empty lists accept everything for that dimension.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub years: Vec<String>,

    /// Two-digit months, e.g. "01"
    #[serde(default)]
    pub months: Vec<String>,

    /// Two-digit days of month, e.g. "31"
    #[serde(default)]
    pub days: Vec<String>,

    #[serde(default)]
    pub topics: Vec<String>,

    /// Keep every Nth article of a topic-month page
    #[serde(rename = "sampling-stride", default = "default_stride")]
    pub sampling_stride: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            years: Vec::new(),
            months: Vec::new(),
            days: Vec::new(),
            topics: Vec::new(),
            sampling_stride: default_stride(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent article workers; defaults to hardware parallelism
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Overall request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops before a fetch fails
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Bodies longer than this are truncated and flagged
    #[serde(rename = "max-body-chars", default = "default_max_body_chars")]
    pub max_body_chars: usize,

    /// Bodies shorter than this are flagged as empty
    #[serde(rename = "min-body-chars", default = "default_min_body_chars")]
    pub min_body_chars: usize,
}

impl CrawlerConfig {
    /// Effective worker pool size
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
            max_body_chars: default_max_body_chars(),
            min_body_chars: default_min_body_chars(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// CSS selectors describing the archive's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "year-list")]
    pub year_list: String,

    #[serde(rename = "year-item")]
    pub year_item: String,

    pub section: String,

    #[serde(rename = "month-container")]
    pub month_container: String,

    /// Which matching container holds the article list (zero-based)
    #[serde(rename = "month-container-index")]
    pub month_container_index: usize,

    #[serde(rename = "article-link")]
    pub article_link: String,

    #[serde(rename = "article-date")]
    pub article_date: String,

    pub title: String,

    pub byline: String,

    pub paragraph: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            year_list: "ul.sitemap-year".to_string(),
            year_item: "li.date".to_string(),
            section: "li.section".to_string(),
            month_container: "div.sitemap-entry".to_string(),
            month_container_index: 1,
            article_link: "span.sitemap-link".to_string(),
            article_date: "span.date".to_string(),
            title: "h1".to_string(),
            byline: "span.byline__name".to_string(),
            paragraph: "p.paragraph.inline-placeholder".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the records and error files
    pub directory: String,

    /// Stem used for generated file names
    #[serde(rename = "file-prefix", default = "default_file_prefix")]
    pub file_prefix: String,

    /// Drop EMPTY records before persistence
    #[serde(rename = "drop-empty", default = "default_true")]
    pub drop_empty: bool,

    /// Optional SQLite database receiving the same rows
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

fn default_publisher() -> String {
    "CNN".to_string()
}

fn default_stride() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_max_body_chars() -> usize {
    31_500
}

fn default_min_body_chars() -> usize {
    10
}

fn default_file_prefix() -> String {
    "articles".to_string()
}

fn default_true() -> bool {
    true
}
