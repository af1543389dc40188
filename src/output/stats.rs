//! Run summary built from the drained results
//!
//! This module provides the end-of-run counts and their console rendering.

use crate::crawler::CrawlReport;
use crate::results::{ArticleRecord, CrawlError, ErrorStage, Validity};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// End-of-run statistics
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub config_hash: String,

    /// True when the top index was unusable and nothing below it was visited
    pub aborted: bool,

    /// Record counts by validity flag, before empty records are dropped
    pub records_by_validity: HashMap<Validity, u64>,

    /// Error counts by stage
    pub errors_by_stage: HashMap<ErrorStage, u64>,

    /// Records persisted after the drop-empty step
    pub records_written: u64,

    /// EMPTY records removed before persistence
    pub dropped_empty: u64,

    pub years_visited: usize,
    pub topic_months_visited: usize,
    pub articles_dispatched: usize,
    pub articles_skipped: usize,
}

impl RunSummary {
    /// Builds a summary from a report and the records that will be persisted
    pub fn new(report: &CrawlReport, written: &[ArticleRecord], config_hash: &str) -> Self {
        let records_by_validity = count_by(&report.records, |r| r.validity);
        let errors_by_stage = count_by(&report.errors, |e: &CrawlError| e.stage);

        Self {
            started_at: report.started_at,
            finished_at: report.finished_at,
            elapsed: report.elapsed,
            config_hash: config_hash.to_string(),
            aborted: report.aborted,
            records_by_validity,
            errors_by_stage,
            records_written: written.len() as u64,
            dropped_empty: report.records.len().saturating_sub(written.len()) as u64,
            years_visited: report.years_visited,
            topic_months_visited: report.topic_months_visited,
            articles_dispatched: report.articles_dispatched,
            articles_skipped: report.articles_skipped,
        }
    }

    pub fn total_records(&self) -> u64 {
        self.records_by_validity.values().sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.errors_by_stage.values().sum()
    }

    pub fn validity_count(&self, validity: Validity) -> u64 {
        self.records_by_validity.get(&validity).copied().unwrap_or(0)
    }

    pub fn stage_count(&self, stage: ErrorStage) -> u64 {
        self.errors_by_stage.get(&stage).copied().unwrap_or(0)
    }

    /// Percentage of dispatched articles that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.articles_dispatched == 0 {
            return 0.0;
        }
        (self.total_records() as f64 / self.articles_dispatched as f64) * 100.0
    }
}

fn count_by<T, K, F>(items: &[T], key: F) -> HashMap<K, u64>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    if summary.aborted {
        println!("Status: ABORTED (top index unavailable)\n");
    }

    println!("Overview:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Elapsed: {:.1?}", summary.elapsed);
    println!("  Config hash: {}", summary.config_hash);
    println!("  Years visited: {}", summary.years_visited);
    println!("  Topic-months visited: {}", summary.topic_months_visited);
    println!(
        "  Articles dispatched: {} (skipped {})",
        summary.articles_dispatched, summary.articles_skipped
    );
    println!();

    println!("Records ({}):", summary.total_records());
    for validity in Validity::all() {
        println!("  {}: {}", validity, summary.validity_count(validity));
    }
    println!("  Written: {}", summary.records_written);
    if summary.dropped_empty > 0 {
        println!("  Dropped empty: {}", summary.dropped_empty);
    }
    println!();

    if summary.total_errors() > 0 {
        println!("Errors ({}):", summary.total_errors());
        for stage in ErrorStage::all() {
            let count = summary.stage_count(stage);
            if count > 0 {
                println!("  {}: {}", stage, count);
            }
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} articles extracted)",
        summary.success_rate(),
        summary.total_records(),
        summary.articles_dispatched
    );
}
