//! Article dispatcher
//!
//! Fans the article entries of one topic-month page out over a bounded pool
//! of workers. Each worker fetches one page, extracts it and records either
//! a record or an error in the shared aggregator; one failure never stops
//! its siblings. Results arrive in no particular order.

use crate::crawler::extractor::{ArticleContext, ArticleExtractor};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::filter::CrawlFilter;
use crate::crawler::parser::ArticleEntry;
use crate::results::{CrawlError, ResultAggregator};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Counts for one dispatched topic-month batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Entries pruned by stride or day filter; never fetched
    pub skipped: usize,
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Bounded fan-out of article work
pub struct ArticleDispatcher {
    fetcher: PageFetcher,
    extractor: Arc<ArticleExtractor>,
    concurrency: usize,
    publisher: Arc<str>,
    started: Instant,
}

impl ArticleDispatcher {
    /// Creates a dispatcher with `concurrency` workers (at least one)
    pub fn new(
        fetcher: PageFetcher,
        extractor: ArticleExtractor,
        concurrency: usize,
        publisher: &str,
    ) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(extractor),
            concurrency: concurrency.max(1),
            publisher: Arc::from(publisher),
            started: Instant::now(),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Filters, schedules and awaits every article of one topic-month page
    ///
    /// Sampling stride and day filter are applied before any fetch. Every
    /// dispatched entry produces exactly one record or one error in
    /// `aggregator`.
    pub async fn dispatch(
        &self,
        items: Vec<ArticleEntry>,
        context: &ArticleContext,
        filter: &CrawlFilter,
        aggregator: &Arc<ResultAggregator>,
    ) -> DispatchSummary {
        let total = items.len();
        let (selected, pruned): (Vec<_>, Vec<_>) =
            items.into_iter().partition(|entry| filter.accepts_article(entry));

        let mut summary = DispatchSummary {
            skipped: pruned.len(),
            dispatched: selected.len(),
            ..DispatchSummary::default()
        };

        tracing::debug!(
            "Dispatching {} of {} articles for {} {} (skipped {})",
            summary.dispatched,
            total,
            context.topic,
            context.year,
            summary.skipped
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let context = Arc::new(context.clone());
        let mut workers = JoinSet::new();

        for entry in selected {
            // The semaphore is never closed, so acquisition only waits
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };

            let job = ArticleJob {
                fetcher: self.fetcher.clone(),
                extractor: Arc::clone(&self.extractor),
                aggregator: Arc::clone(aggregator),
                context: Arc::clone(&context),
                publisher: Arc::clone(&self.publisher),
                total,
                started: self.started,
            };

            workers.spawn(async move {
                let _permit = permit;
                job.run(entry).await
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(true) => summary.succeeded += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!("Article worker did not complete: {}", e);
                }
            }
        }

        summary
    }
}

/// Everything one worker needs, owned so it can move into a task
struct ArticleJob {
    fetcher: PageFetcher,
    extractor: Arc<ArticleExtractor>,
    aggregator: Arc<ResultAggregator>,
    context: Arc<ArticleContext>,
    publisher: Arc<str>,
    total: usize,
    started: Instant,
}

impl ArticleJob {
    /// Returns true when a record was produced
    async fn run(self, entry: ArticleEntry) -> bool {
        let markup = match self.fetcher.fetch(&entry.url).await {
            Ok(markup) => markup,
            Err(e) => {
                self.aggregator.record_error(CrawlError::fetch(&entry.url, e));
                return false;
            }
        };

        let extracted = match self.extractor.extract(&markup, &entry.url) {
            Ok(extracted) => extracted,
            Err(e) => {
                self.aggregator.record_error(CrawlError::parse(&entry.url, e));
                return false;
            }
        };

        let record = extracted.into_record(
            self.aggregator.next_sequence(),
            &self.context,
            &entry.month(),
            entry.day(),
            &self.publisher,
        );

        if entry.ordinal % 10 == 0 {
            tracing::info!(
                "{} {} {} {}/{} {:.1?}",
                record.topic,
                record.month,
                record.year,
                entry.ordinal,
                self.total,
                self.started.elapsed()
            );
        }

        self.aggregator.record(record);
        true
    }
}
