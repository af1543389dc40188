use crate::results::{ErrorStage, Validity};
use std::fmt;

/// One successfully extracted article
///
/// Created once per parsed article and never mutated afterwards.
/// `character_count` is the length of the body as extracted, even when
/// `body` holds a truncated copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Unique within a run; contiguous only when articles run one at a time
    pub sequence_number: u64,

    pub url: String,

    /// Headline, already quoted for tabular output
    pub title: String,

    pub body: String,

    pub author: Option<String>,

    pub publisher: String,

    pub topic: String,

    pub year: String,

    pub month: String,

    pub day: String,

    pub character_count: usize,

    pub validity: Validity,
}

impl ArticleRecord {
    /// Returns true if the body is too short to be a text article
    pub fn is_empty_article(&self) -> bool {
        self.validity == Validity::Empty
    }
}

/// A recorded failure for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlError {
    pub stage: ErrorStage,

    pub url: String,

    pub message: String,
}

impl CrawlError {
    pub fn new(stage: ErrorStage, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage,
            url: url.into(),
            message: message.into(),
        }
    }

    /// A failure to retrieve a page
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::new(ErrorStage::Fetch, url, message.to_string())
    }

    /// A missing element on a retrieved page
    pub fn parse(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::new(ErrorStage::Parse, url, message.to_string())
    }

    /// A link/date count mismatch on a topic-month page
    pub fn structural(url: impl Into<String>, link_count: usize, date_count: usize) -> Self {
        Self::new(
            ErrorStage::Structural,
            url,
            format!(
                "{} article links but {} dates on topic-month page",
                link_count, date_count
            ),
        )
    }
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error at {}: {}", self.stage, self.url, self.message)
    }
}
