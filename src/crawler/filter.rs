//! Traversal filter
//!
//! Pure predicates applied at each level before anything is fetched.

use crate::config::FilterConfig;
use crate::crawler::parser::{ArticleEntry, TopicMonthEntry, YearEntry};
use std::collections::HashSet;

/// Read-only selection of years, months, days, topics and a sampling stride
///
/// An empty set accepts every value of its dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFilter {
    years: HashSet<String>,
    months: HashSet<String>,
    days: HashSet<String>,
    topics: HashSet<String>,
    stride: usize,
}

impl CrawlFilter {
    /// Builds a filter; a stride of 0 is treated as 1
    pub fn new<I, S>(years: I, months: I, days: I, topics: I, stride: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            years: years.into_iter().map(Into::into).collect(),
            months: months.into_iter().map(Into::into).collect(),
            days: days.into_iter().map(Into::into).collect(),
            topics: topics.into_iter().map(Into::into).collect(),
            stride: stride.max(1),
        }
    }

    /// A filter that keeps everything
    pub fn accept_all() -> Self {
        Self::new(Vec::<String>::new(), vec![], vec![], vec![], 1)
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            config.years.iter().cloned(),
            config.months.iter().cloned(),
            config.days.iter().cloned(),
            config.topics.iter().cloned(),
            config.sampling_stride,
        )
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn accepts_year(&self, entry: &YearEntry) -> bool {
        accepts(&self.years, &entry.year)
    }

    /// Topic must be selected; month must be selected, and an entry whose
    /// URL encodes no month only passes when months are unrestricted
    pub fn accepts_topic_month(&self, entry: &TopicMonthEntry) -> bool {
        if !accepts(&self.topics, &entry.topic) {
            return false;
        }
        match &entry.month {
            Some(month) => accepts(&self.months, month),
            None => self.months.is_empty(),
        }
    }

    /// Sampling stride and day set, checked before any article fetch
    pub fn accepts_article(&self, entry: &ArticleEntry) -> bool {
        entry.ordinal % self.stride == 0 && accepts(&self.days, &entry.day())
    }

    /// Human-readable description of one dimension, for dry runs and logs
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("years", describe_set(&self.years)),
            ("months", describe_set(&self.months)),
            ("days", describe_set(&self.days)),
            ("topics", describe_set(&self.topics)),
            ("sampling stride", self.stride.to_string()),
        ]
    }

    /// Label used in output file names: selected years joined by '&'
    pub fn years_label(&self) -> String {
        if self.years.is_empty() {
            return "all".to_string();
        }
        let mut years: Vec<&str> = self.years.iter().map(String::as_str).collect();
        years.sort_unstable();
        years.join("&")
    }
}

fn accepts(set: &HashSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

fn describe_set(set: &HashSet<String>) -> String {
    if set.is_empty() {
        return "all".to_string();
    }
    let mut values: Vec<&str> = set.iter().map(String::as_str).collect();
    values.sort_unstable();
    values.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn year(year: &str) -> YearEntry {
        YearEntry {
            year: year.to_string(),
            url: format!("https://www.cnn.com/article/sitemap-{}.html", year),
        }
    }

    fn topic_month(topic: &str, month: Option<&str>) -> TopicMonthEntry {
        TopicMonthEntry {
            topic: topic.to_string(),
            month: month.map(str::to_string),
            url: "https://www.cnn.com/x/article/sitemap-2016-1.html".to_string(),
        }
    }

    fn article(ordinal: usize, day: u32) -> ArticleEntry {
        ArticleEntry {
            url: format!("https://www.cnn.com/story-{}", ordinal),
            published: NaiveDate::from_ymd_opt(2016, 1, day).unwrap(),
            ordinal,
        }
    }

    #[test]
    fn test_empty_sets_accept_everything() {
        let filter = CrawlFilter::accept_all();
        assert!(filter.accepts_year(&year("1999")));
        assert!(filter.accepts_topic_month(&topic_month("Travel", Some("07"))));
        assert!(filter.accepts_topic_month(&topic_month("Travel", None)));
        assert!(filter.accepts_article(&article(3, 17)));
    }

    #[test]
    fn test_year_filter() {
        let filter = CrawlFilter::new(vec!["2016"], vec![], vec![], vec![], 1);
        assert!(filter.accepts_year(&year("2016")));
        assert!(!filter.accepts_year(&year("2017")));
    }

    #[test]
    fn test_topic_and_month_filter() {
        let filter = CrawlFilter::new(vec![], vec!["01"], vec![], vec!["Politics", "US"], 1);
        assert!(filter.accepts_topic_month(&topic_month("Politics", Some("01"))));
        assert!(!filter.accepts_topic_month(&topic_month("Politics", Some("02"))));
        assert!(!filter.accepts_topic_month(&topic_month("Entertainment", Some("01"))));
        assert!(!filter.accepts_topic_month(&topic_month("US", None)));
    }

    #[test]
    fn test_sampling_stride_keeps_every_nth_ordinal() {
        let filter = CrawlFilter::new(Vec::<String>::new(), vec![], vec![], vec![], 3);
        let kept: Vec<usize> = (0..10)
            .map(|i| article(i, 1))
            .filter(|a| filter.accepts_article(a))
            .map(|a| a.ordinal)
            .collect();
        assert_eq!(kept, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_day_filter() {
        let filter = CrawlFilter::new(vec![], vec![], vec!["01", "15"], vec![], 1);
        assert!(filter.accepts_article(&article(0, 1)));
        assert!(filter.accepts_article(&article(1, 15)));
        assert!(!filter.accepts_article(&article(2, 16)));
    }

    #[test]
    fn test_zero_stride_treated_as_one() {
        let filter = CrawlFilter::new(Vec::<String>::new(), vec![], vec![], vec![], 0);
        assert_eq!(filter.stride(), 1);
    }

    #[test]
    fn test_years_label() {
        assert_eq!(CrawlFilter::accept_all().years_label(), "all");
        let filter = CrawlFilter::new(vec!["2022", "2016"], vec![], vec![], vec![], 1);
        assert_eq!(filter.years_label(), "2016&2022");
    }
}
