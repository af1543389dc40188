//! Index page parsers
//!
//! This module turns the markup of the three index levels into the entries
//! of the level below:
//! - Top index → one `YearEntry` per listed year
//! - Year index → one `TopicMonthEntry` per topic section and month
//! - Topic-month index → one `ArticleEntry` per article, paired with its date
//!
//! All functions are pure over already-fetched markup.

use crate::config::validation::compile_selector;
use crate::config::SelectorConfig;
use crate::url::{month_from_url, resolve_link};
use crate::ConfigError;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// An expected structural element was absent or unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing container element '{0}'")]
    MissingContainer(String),

    #[error("Entry {ordinal} has no usable link")]
    MissingLink { ordinal: usize },

    #[error("Entry {ordinal} has malformed date '{text}'")]
    MalformedDate { ordinal: usize, text: String },
}

/// A year listed on the top index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearEntry {
    pub year: String,
    pub url: String,
}

/// One topic's page for one month, listed on a year index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMonthEntry {
    pub topic: String,

    /// Zero-padded month derived from the URL, when the URL encodes one
    pub month: Option<String>,

    pub url: String,
}

/// One article listed on a topic-month index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleEntry {
    pub url: String,
    pub published: NaiveDate,

    /// Position on the topic-month page, starting at 0
    pub ordinal: usize,
}

impl ArticleEntry {
    /// Two-digit day of month
    pub fn day(&self) -> String {
        self.published.format("%d").to_string()
    }

    /// Two-digit month
    pub fn month(&self) -> String {
        self.published.format("%m").to_string()
    }
}

/// A topic-month entry that could not be turned into an `ArticleEntry`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub ordinal: usize,

    /// Resolved article URL, when the link itself was usable
    pub url: Option<String>,

    pub error: ParseError,
}

/// Parsed topic-month page
///
/// Links and dates are paired by position. When their counts differ no
/// entries are produced and the caller decides what to do with the page.
/// A single unusable pair lands in `rejected`; its siblings keep their
/// original ordinals in `entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMonthIndex {
    pub entries: Vec<ArticleEntry>,
    pub rejected: Vec<RejectedEntry>,
    pub link_count: usize,
    pub date_count: usize,
}

impl TopicMonthIndex {
    pub fn count_mismatch(&self) -> bool {
        self.link_count != self.date_count
    }
}

/// Parser for the three index levels, built from configured selectors
#[derive(Debug)]
pub struct IndexParser {
    base_url: Url,
    year_list: Selector,
    year_item: Selector,
    section: Selector,
    month_container: Selector,
    month_container_index: usize,
    article_link: Selector,
    article_date: Selector,
    anchor: Selector,
    selector_source: SelectorConfig,
}

impl IndexParser {
    /// Compiles the selectors and remembers the base URL for relative links
    pub fn new(base_url: Url, selectors: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url,
            year_list: compile_selector(&selectors.year_list)?,
            year_item: compile_selector(&selectors.year_item)?,
            section: compile_selector(&selectors.section)?,
            month_container: compile_selector(&selectors.month_container)?,
            month_container_index: selectors.month_container_index,
            article_link: compile_selector(&selectors.article_link)?,
            article_date: compile_selector(&selectors.article_date)?,
            anchor: compile_selector("a[href]")?,
            selector_source: selectors.clone(),
        })
    }

    /// Extracts the year entries from the top index
    ///
    /// Items without a usable link are skipped.
    pub fn parse_top_index(&self, markup: &str) -> Result<Vec<YearEntry>, ParseError> {
        let document = Html::parse_document(markup);

        let list = document.select(&self.year_list).next().ok_or_else(|| {
            ParseError::MissingContainer(self.selector_source.year_list.clone())
        })?;

        let mut years = Vec::new();
        for item in list.select(&self.year_item) {
            let year = element_text(&item);
            match self.first_link(&item) {
                Some(url) => years.push(YearEntry {
                    year,
                    url: url.to_string(),
                }),
                None => tracing::debug!("Year item '{}' has no link, skipping", year),
            }
        }

        Ok(years)
    }

    /// Extracts the topic-month entries from a year index
    pub fn parse_year_index(&self, markup: &str) -> Result<Vec<TopicMonthEntry>, ParseError> {
        let document = Html::parse_document(markup);

        let mut sections = document.select(&self.section).peekable();
        if sections.peek().is_none() {
            return Err(ParseError::MissingContainer(
                self.selector_source.section.clone(),
            ));
        }

        let mut entries = Vec::new();
        for section in sections {
            let topic = element_text(&section);
            let Some(href) = section
                .select(&self.anchor)
                .next()
                .and_then(|a| a.value().attr("href"))
            else {
                tracing::debug!("Section '{}' has no link, skipping", topic);
                continue;
            };

            let Some(url) = resolve_link(href, &self.base_url) else {
                tracing::debug!("Section '{}' link '{}' is not crawlable", topic, href);
                continue;
            };

            entries.push(TopicMonthEntry {
                topic,
                month: month_from_url(href),
                url: url.to_string(),
            });
        }

        Ok(entries)
    }

    /// Extracts article entries from a topic-month index
    ///
    /// Links and dates are counted inside the configured container. A count
    /// mismatch is reported through [`TopicMonthIndex::count_mismatch`] rather
    /// than as an error. Only a missing container fails the whole page.
    pub fn parse_topic_month_index(&self, markup: &str) -> Result<TopicMonthIndex, ParseError> {
        let document = Html::parse_document(markup);

        let container = document
            .select(&self.month_container)
            .nth(self.month_container_index)
            .ok_or_else(|| {
                ParseError::MissingContainer(format!(
                    "{} #{}",
                    self.selector_source.month_container, self.month_container_index
                ))
            })?;

        let links: Vec<ElementRef> = container.select(&self.article_link).collect();
        let dates: Vec<ElementRef> = container.select(&self.article_date).collect();

        let mut index = TopicMonthIndex {
            entries: Vec::new(),
            rejected: Vec::new(),
            link_count: links.len(),
            date_count: dates.len(),
        };

        if index.count_mismatch() {
            return Ok(index);
        }

        for (ordinal, (link, date)) in links.iter().zip(dates.iter()).enumerate() {
            let Some(url) = self.first_link(link) else {
                index.rejected.push(RejectedEntry {
                    ordinal,
                    url: None,
                    error: ParseError::MissingLink { ordinal },
                });
                continue;
            };

            let text = element_text(date);
            let Some(published) = parse_date(&text) else {
                index.rejected.push(RejectedEntry {
                    ordinal,
                    url: Some(url.to_string()),
                    error: ParseError::MalformedDate { ordinal, text },
                });
                continue;
            };

            index.entries.push(ArticleEntry {
                url: url.to_string(),
                published,
                ordinal,
            });
        }

        Ok(index)
    }

    fn first_link(&self, element: &ElementRef) -> Option<Url> {
        element
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_link(href, &self.base_url))
    }
}

/// Trimmed concatenated text of an element
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parses the leading `YYYY-MM-DD` of a date element's text
fn parse_date(text: &str) -> Option<NaiveDate> {
    let head = text.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}
