use crate::results::{ArticleRecord, CrawlError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Collected {
    records: Vec<ArticleRecord>,
    errors: Vec<CrawlError>,
}

/// Run-lifetime collection of records and errors
///
/// Shared by every article worker through an `Arc`. Both collections sit
/// behind one mutex so a record and an error can never be interleaved
/// mid-write. Nothing is deduplicated.
#[derive(Debug)]
pub struct ResultAggregator {
    collected: Mutex<Collected>,
    next_sequence: AtomicU64,
}

impl ResultAggregator {
    /// Creates an empty aggregator whose first sequence number is 1
    pub fn new() -> Self {
        Self {
            collected: Mutex::new(Collected::default()),
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Hands out a sequence number unique for the lifetime of this aggregator
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    pub fn record(&self, record: ArticleRecord) {
        self.lock().records.push(record);
    }

    pub fn record_error(&self, error: CrawlError) {
        tracing::warn!("{}", error);
        self.lock().errors.push(error);
    }

    /// Number of (records, errors) collected so far
    pub fn counts(&self) -> (usize, usize) {
        let collected = self.lock();
        (collected.records.len(), collected.errors.len())
    }

    /// Takes everything collected so far, leaving the aggregator empty
    pub fn drain(&self) -> (Vec<ArticleRecord>, Vec<CrawlError>) {
        let mut collected = self.lock();
        (
            std::mem::take(&mut collected.records),
            std::mem::take(&mut collected.errors),
        )
    }

    // A worker that panicked mid-push leaves the vectors intact, so a
    // poisoned lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, Collected> {
        self.collected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}
