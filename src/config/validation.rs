use crate::config::types::{
    ArchiveConfig, Config, CrawlerConfig, FilterConfig, OutputConfig, SelectorConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_archive_config(&config.archive)?;
    validate_filter_config(&config.filter)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_selector_config(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Compiles a CSS selector, mapping failures to a config error
pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Validates archive location configuration
fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    validate_http_url("base-url", &config.base_url)?;
    validate_http_url("top-index-url", &config.top_index_url)?;

    if config.publisher.trim().is_empty() {
        return Err(ConfigError::Validation(
            "publisher cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the harvest filter
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.sampling_stride < 1 {
        return Err(ConfigError::Validation(format!(
            "sampling_stride must be >= 1, got {}",
            config.sampling_stride
        )));
    }

    for year in &config.years {
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Validation(format!(
                "year must be four digits, got '{}'",
                year
            )));
        }
    }

    for month in &config.months {
        validate_two_digit("month", month, 12)?;
    }

    for day in &config.days {
        validate_two_digit("day", day, 31)?;
    }

    for topic in &config.topics {
        if topic.trim().is_empty() {
            return Err(ConfigError::Validation(
                "topic names cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if let Some(concurrency) = config.concurrency {
        if !(1..=256).contains(&concurrency) {
            return Err(ConfigError::Validation(format!(
                "concurrency must be between 1 and 256, got {}",
                concurrency
            )));
        }
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.min_body_chars >= config.max_body_chars {
        return Err(ConfigError::Validation(format!(
            "min_body_chars ({}) must be smaller than max_body_chars ({})",
            config.min_body_chars, config.max_body_chars
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates that every selector compiles
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.year_list,
        &config.year_item,
        &config.section,
        &config.month_container,
        &config.article_link,
        &config.article_date,
        &config.title,
        &config.byline,
        &config.paragraph,
    ] {
        compile_selector(selector)?;
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file_prefix cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.database_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "database_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Parses a URL and requires an HTTP(S) scheme
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Checks a zero-padded two-digit number within `1..=max`
fn validate_two_digit(field: &str, value: &str, max: u32) -> Result<(), ConfigError> {
    let in_range = value.len() == 2
        && value
            .parse::<u32>()
            .map(|n| (1..=max).contains(&n))
            .unwrap_or(false);

    if !in_range {
        return Err(ConfigError::Validation(format!(
            "{} must be a two-digit value between 01 and {:02}, got '{}'",
            field, max, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
