//! Article page extraction
//!
//! Pulls the headline, byline and body paragraphs out of one article page
//! and applies the length policy:
//!
//! | Original body length | Stored body | Flag |
//! |----------------------|-------------|------|
//! | `< min_chars` | unchanged | `Empty` |
//! | `> max_chars` | first `max_chars` characters | `Truncated` |
//! | otherwise | unchanged | `Ok` |
//!
//! The character count always reports the original length. The default
//! ceiling of 31500 stays under the 32767-character spreadsheet cell limit
//! with room for re-encoding expansion.

use crate::config::validation::compile_selector;
use crate::config::{CrawlerConfig, SelectorConfig};
use crate::output::quote_cell;
use crate::results::{ArticleRecord, Validity};
use crate::ConfigError;
use scraper::{Html, Selector};
use thiserror::Error;

/// Why an article page produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Missing title")]
    MissingTitle,

    #[error("Missing body")]
    MissingBody,
}

/// Traversal context attached to every record of one topic-month page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContext {
    pub topic: String,
    pub year: String,

    /// Month derived from the topic-month URL; the entry date is used when absent
    pub month: Option<String>,
}

/// Fields extracted from one article page, before numbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub url: String,
    pub title: String,
    pub author: Option<String>,
    pub body: String,
    pub character_count: usize,
    pub validity: Validity,
}

impl ExtractedArticle {
    /// Attaches a sequence number and traversal context
    pub fn into_record(
        self,
        sequence_number: u64,
        context: &ArticleContext,
        month_fallback: &str,
        day: String,
        publisher: &str,
    ) -> ArticleRecord {
        ArticleRecord {
            sequence_number,
            url: self.url,
            title: self.title,
            body: self.body,
            author: self.author,
            publisher: publisher.to_string(),
            topic: context.topic.clone(),
            year: context.year.clone(),
            month: context
                .month
                .clone()
                .unwrap_or_else(|| month_fallback.to_string()),
            day,
            character_count: self.character_count,
            validity: self.validity,
        }
    }
}

/// Extractor built from configured selectors and length bounds
#[derive(Debug)]
pub struct ArticleExtractor {
    title: Selector,
    byline: Selector,
    paragraph: Selector,
    min_chars: usize,
    max_chars: usize,
}

impl ArticleExtractor {
    pub fn new(selectors: &SelectorConfig, crawler: &CrawlerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile_selector(&selectors.title)?,
            byline: compile_selector(&selectors.byline)?,
            paragraph: compile_selector(&selectors.paragraph)?,
            min_chars: crawler.min_body_chars,
            max_chars: crawler.max_body_chars,
        })
    }

    /// Extracts one article
    ///
    /// Deterministic: the same markup always yields the same result.
    pub fn extract(&self, markup: &str, article_url: &str) -> Result<ExtractedArticle, ExtractError> {
        let document = Html::parse_document(markup);

        let title = document
            .select(&self.title)
            .next()
            .map(|h| h.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ExtractError::MissingTitle)?;

        let author = document
            .select(&self.byline)
            .next()
            .map(|b| b.text().collect::<String>().trim().to_string())
            .filter(|a| !a.is_empty());

        let mut paragraphs = document.select(&self.paragraph).peekable();
        if paragraphs.peek().is_none() {
            return Err(ExtractError::MissingBody);
        }

        let full_body = paragraphs
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let character_count = full_body.chars().count();
        let validity = Validity::classify(character_count, self.min_chars, self.max_chars);

        let body = match validity {
            Validity::Truncated => full_body.chars().take(self.max_chars).collect(),
            Validity::Ok | Validity::Empty => full_body,
        };

        if validity != Validity::Ok {
            tracing::debug!(
                "{} body of {} characters at {}",
                validity,
                character_count,
                article_url
            );
        }

        Ok(ExtractedArticle {
            url: article_url.to_string(),
            title: quote_cell(&title),
            author,
            body,
            character_count,
            validity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.cnn.com/2016/01/05/politics/story/index.html";

    fn extractor() -> ArticleExtractor {
        ArticleExtractor::new(&SelectorConfig::default(), &CrawlerConfig::default()).unwrap()
    }

    fn article(title: &str, byline: &str, paragraphs: &[&str]) -> String {
        let paragraphs: String = paragraphs
            .iter()
            .map(|p| format!(r#"<p class="paragraph inline-placeholder">{}</p>"#, p))
            .collect();
        format!(
            r#"<html><body>{}{}<div class="article__content">{}</div>
            <p class="footer">Not part of the story</p></body></html>"#,
            title, byline, paragraphs
        )
    }

    #[test]
    fn test_extract_full_article() {
        let html = article(
            "<h1> Senate passes bill </h1>",
            r#"<span class="byline__name">Jane Doe</span>"#,
            &["  First paragraph. ", "Second, with a comma."],
        );

        let extracted = extractor().extract(&html, URL).unwrap();
        assert_eq!(extracted.url, URL);
        assert_eq!(extracted.title, "\"Senate passes bill\"");
        assert_eq!(extracted.author.as_deref(), Some("Jane Doe"));
        assert_eq!(extracted.body, "First paragraph. Second, with a comma.");
        assert_eq!(extracted.character_count, extracted.body.chars().count());
        assert_eq!(extracted.validity, Validity::Ok);
    }

    #[test]
    fn test_title_embedded_quotes_are_doubled() {
        let html = article(r#"<h1>The "deal" is off</h1>"#, "", &["Some body text here."]);
        let extracted = extractor().extract(&html, URL).unwrap();
        assert_eq!(extracted.title, "\"The \"\"deal\"\" is off\"");
    }

    #[test]
    fn test_missing_author_is_not_an_error() {
        let html = article("<h1>Title</h1>", "", &["Body text long enough."]);
        let extracted = extractor().extract(&html, URL).unwrap();
        assert_eq!(extracted.author, None);
    }

    #[test]
    fn test_missing_title() {
        let html = article("", "", &["Body text long enough."]);
        assert_eq!(
            extractor().extract(&html, URL),
            Err(ExtractError::MissingTitle)
        );
    }

    #[test]
    fn test_missing_body() {
        let html = article("<h1>Video: highlights</h1>", "", &[]);
        assert_eq!(
            extractor().extract(&html, URL),
            Err(ExtractError::MissingBody)
        );
    }

    #[test]
    fn test_short_body_is_flagged_empty() {
        let html = article("<h1>Graphic</h1>", "", &["Watch", ""]);
        let extracted = extractor().extract(&html, URL).unwrap();
        assert_eq!(extracted.body, "Watch");
        assert_eq!(extracted.character_count, 5);
        assert_eq!(extracted.validity, Validity::Empty);
    }

    #[test]
    fn test_long_body_truncated_but_count_is_original() {
        let long_paragraph = "a".repeat(20_000);
        let html = article("<h1>Long read</h1>", "", &[&long_paragraph, &long_paragraph]);

        let extracted = extractor().extract(&html, URL).unwrap();
        assert_eq!(extracted.character_count, 40_001);
        assert_eq!(extracted.body.chars().count(), 31_500);
        assert_eq!(extracted.validity, Validity::Truncated);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let crawler = CrawlerConfig {
            max_body_chars: 12,
            min_body_chars: 1,
            ..CrawlerConfig::default()
        };
        let extractor = ArticleExtractor::new(&SelectorConfig::default(), &crawler).unwrap();
        let html = article("<h1>Quotes</h1>", "", &["it’s – “quoted” text"]);

        let extracted = extractor.extract(&html, URL).unwrap();
        assert_eq!(extracted.character_count, 20);
        assert_eq!(extracted.body, "it’s – “quot");
        assert_eq!(extracted.validity, Validity::Truncated);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let html = article(
            "<h1>Same</h1>",
            r#"<span class="byline__name">A. Writer</span>"#,
            &["One.", "Two.", "Three."],
        );
        let first = extractor().extract(&html, URL).unwrap();
        let second = extractor().extract(&html, URL).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_record_uses_context() {
        let html = article("<h1>Title</h1>", "", &["Body text long enough."]);
        let extracted = extractor().extract(&html, URL).unwrap();
        let context = ArticleContext {
            topic: "Politics".to_string(),
            year: "2016".to_string(),
            month: None,
        };

        let record = extracted.into_record(42, &context, "01", "05".to_string(), "CNN");
        assert_eq!(record.sequence_number, 42);
        assert_eq!(record.topic, "Politics");
        assert_eq!(record.year, "2016");
        assert_eq!(record.month, "01");
        assert_eq!(record.day, "05");
        assert_eq!(record.publisher, "CNN");
    }
}
