//! Traversal engine - main harvest orchestration logic
//!
//! This module walks the archive from the top index down:
//! - Top index → years accepted by the filter
//! - Year index → topic-month pages accepted by the filter
//! - Topic-month index → article batches handed to the dispatcher
//!
//! Index navigation is sequential. A failure at any node is recorded and the
//! walk continues with that node's siblings; only an unusable top index ends
//! the run early.

use crate::config::Config;
use crate::crawler::dispatcher::{ArticleDispatcher, DispatchSummary};
use crate::crawler::extractor::{ArticleContext, ArticleExtractor};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::filter::CrawlFilter;
use crate::crawler::parser::{IndexParser, TopicMonthEntry, YearEntry};
use crate::results::{ArticleRecord, CrawlError, ResultAggregator};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub records: Vec<ArticleRecord>,
    pub errors: Vec<CrawlError>,

    /// True when the top index could not be fetched or parsed
    pub aborted: bool,

    pub years_visited: usize,
    pub topic_months_visited: usize,
    pub articles_dispatched: usize,
    pub articles_skipped: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct Progress {
    years_visited: usize,
    topic_months_visited: usize,
    articles_dispatched: usize,
    articles_skipped: usize,
}

impl Progress {
    fn absorb(&mut self, batch: DispatchSummary) {
        self.articles_dispatched += batch.dispatched;
        self.articles_skipped += batch.skipped;
    }
}

/// Main traversal structure
pub struct TraversalEngine {
    top_index_url: String,
    fetcher: PageFetcher,
    parser: IndexParser,
    dispatcher: ArticleDispatcher,
}

impl TraversalEngine {
    /// Creates a new engine from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(TraversalEngine)` - Selectors compiled and HTTP client built
    /// * `Err(HarvestError)` - A URL, selector or client setting was unusable
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&config.archive.base_url)?;
        let fetcher = PageFetcher::from_config(&config.user_agent, &config.crawler)?;
        let parser = IndexParser::new(base_url, &config.selectors)?;
        let extractor = ArticleExtractor::new(&config.selectors, &config.crawler)?;
        let dispatcher = ArticleDispatcher::new(
            fetcher.clone(),
            extractor,
            config.crawler.effective_concurrency(),
            &config.archive.publisher,
        );

        Ok(Self {
            top_index_url: config.archive.top_index_url.clone(),
            fetcher,
            parser,
            dispatcher,
        })
    }

    /// Runs one harvest with the given filter
    ///
    /// Always returns a report; failures are inside `report.errors`.
    pub async fn run(&self, filter: &CrawlFilter) -> CrawlReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let aggregator = Arc::new(ResultAggregator::new());
        let mut progress = Progress::default();

        tracing::info!(
            "Starting harvest from {} with {} workers",
            self.top_index_url,
            self.dispatcher.concurrency()
        );

        let aborted = match self.load_years(&aggregator).await {
            Some(years) => {
                for year in years.iter().filter(|y| filter.accepts_year(y)) {
                    progress.years_visited += 1;
                    self.walk_year(year, filter, &aggregator, &mut progress)
                        .await;
                }
                false
            }
            None => true,
        };

        let (record_count, error_count) = aggregator.counts();
        tracing::debug!(
            "Draining {} records and {} errors",
            record_count,
            error_count
        );

        let (records, errors) = aggregator.drain();
        let elapsed = start.elapsed();

        if aborted {
            tracing::error!(
                "Harvest aborted: top index {} unavailable",
                self.top_index_url
            );
        }

        tracing::info!(
            "Harvest finished in {:.1?}: {} records, {} errors, {} years, {} topic-months",
            elapsed,
            records.len(),
            errors.len(),
            progress.years_visited,
            progress.topic_months_visited
        );

        CrawlReport {
            records,
            errors,
            aborted,
            years_visited: progress.years_visited,
            topic_months_visited: progress.topic_months_visited,
            articles_dispatched: progress.articles_dispatched,
            articles_skipped: progress.articles_skipped,
            started_at,
            finished_at: Utc::now(),
            elapsed,
        }
    }

    /// Fetches and parses the top index; None means nothing is reachable
    async fn load_years(&self, aggregator: &ResultAggregator) -> Option<Vec<YearEntry>> {
        let markup = match self.fetcher.fetch(&self.top_index_url).await {
            Ok(markup) => markup,
            Err(e) => {
                aggregator.record_error(CrawlError::fetch(&self.top_index_url, e));
                return None;
            }
        };

        match self.parser.parse_top_index(&markup) {
            Ok(years) => {
                tracing::debug!("Top index lists {} years", years.len());
                Some(years)
            }
            Err(e) => {
                aggregator.record_error(CrawlError::parse(&self.top_index_url, e));
                None
            }
        }
    }

    async fn walk_year(
        &self,
        year: &YearEntry,
        filter: &CrawlFilter,
        aggregator: &Arc<ResultAggregator>,
        progress: &mut Progress,
    ) {
        tracing::info!("Entering year {} ({})", year.year, year.url);

        let markup = match self.fetcher.fetch(&year.url).await {
            Ok(markup) => markup,
            Err(e) => {
                aggregator.record_error(CrawlError::fetch(&year.url, e));
                return;
            }
        };

        let topic_months = match self.parser.parse_year_index(&markup) {
            Ok(entries) => entries,
            Err(e) => {
                aggregator.record_error(CrawlError::parse(&year.url, e));
                return;
            }
        };

        for entry in topic_months
            .iter()
            .filter(|e| filter.accepts_topic_month(e))
        {
            progress.topic_months_visited += 1;
            self.walk_topic_month(year, entry, filter, aggregator, progress)
                .await;
        }
    }

    async fn walk_topic_month(
        &self,
        year: &YearEntry,
        entry: &TopicMonthEntry,
        filter: &CrawlFilter,
        aggregator: &Arc<ResultAggregator>,
        progress: &mut Progress,
    ) {
        tracing::info!(
            "Entering {} {} {} ({})",
            entry.topic,
            entry.month.as_deref().unwrap_or("??"),
            year.year,
            entry.url
        );

        let markup = match self.fetcher.fetch(&entry.url).await {
            Ok(markup) => markup,
            Err(e) => {
                aggregator.record_error(CrawlError::fetch(&entry.url, e));
                return;
            }
        };

        let index = match self.parser.parse_topic_month_index(&markup) {
            Ok(index) => index,
            Err(e) => {
                aggregator.record_error(CrawlError::parse(&entry.url, e));
                return;
            }
        };

        if index.count_mismatch() {
            aggregator.record_error(CrawlError::structural(
                &entry.url,
                index.link_count,
                index.date_count,
            ));
            return;
        }

        // Sampled-out positions are never fetched, so their defects go unreported
        for rejected in index
            .rejected
            .iter()
            .filter(|r| r.ordinal % filter.stride() == 0)
        {
            let url = rejected
                .url
                .clone()
                .unwrap_or_else(|| format!("{}#{}", entry.url, rejected.ordinal));
            aggregator.record_error(CrawlError::parse(url, &rejected.error));
        }

        let context = ArticleContext {
            topic: entry.topic.clone(),
            year: year.year.clone(),
            month: entry.month.clone(),
        };

        let batch = self
            .dispatcher
            .dispatch(index.entries, &context, filter, aggregator)
            .await;

        tracing::info!(
            "Finished {} {} {}: {} ok, {} failed, {} skipped",
            entry.topic,
            entry.month.as_deref().unwrap_or("??"),
            year.year,
            batch.succeeded,
            batch.failed,
            batch.skipped
        );

        progress.absorb(batch);
    }
}

/// Runs a complete harvest with the filter described by `config`
///
/// # Example
///
/// ```no_run
/// use sitemap_harvest::config::load_config;
/// use sitemap_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_harvest(&config).await?;
/// println!("{} records", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: &Config) -> Result<CrawlReport, HarvestError> {
    let engine = TraversalEngine::new(config)?;
    let filter = CrawlFilter::from_config(&config.filter);
    Ok(engine.run(&filter).await)
}
