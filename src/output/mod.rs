//! Output module for persisting harvest results
//!
//! This module handles:
//! - Writing article records as comma-separated rows
//! - Writing the per-run error log
//! - Optionally mirroring both into SQLite
//! - Computing and printing the run summary

mod sqlite_output;
pub mod stats;
mod tabular;
mod traits;

pub use sqlite_output::{initialize_schema, SqliteSink};
pub use stats::{print_summary, RunSummary};
pub use tabular::{
    escape_cell, format_row, quote_cell, unquote_cell, ErrorLogWriter, TabularWriter, HEADER,
};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::config::Config;
use crate::crawler::CrawlReport;
use crate::results::ArticleRecord;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Locations of the files written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub records: PathBuf,
    pub errors: PathBuf,
}

/// Builds `<dir>/<prefix>-<years>-<YYYYmmdd-HHMMSS>.csv` and its `-ERRORS.txt` sibling
pub fn output_paths(
    directory: &Path,
    file_prefix: &str,
    years_label: &str,
    timestamp: DateTime<Local>,
) -> OutputPaths {
    let stem = format!(
        "{}-{}-{}",
        file_prefix,
        years_label,
        timestamp.format("%Y%m%d-%H%M%S")
    );

    OutputPaths {
        records: directory.join(format!("{}.csv", stem)),
        errors: directory.join(format!("{}-ERRORS.txt", stem)),
    }
}

/// Writes a finished run to every configured sink
///
/// EMPTY records are removed first when `output.drop-empty` is set. The
/// error log is always written, so an aborted run still leaves a trace.
///
/// # Returns
///
/// * `Ok((OutputPaths, RunSummary))` - Files written and the run summary
/// * `Err(OutputError)` - A file or database could not be written
pub fn write_outputs(
    report: &CrawlReport,
    config: &Config,
    config_hash: &str,
    years_label: &str,
) -> OutputResult<(OutputPaths, RunSummary)> {
    let directory = Path::new(&config.output.directory);
    std::fs::create_dir_all(directory)?;

    let paths = output_paths(
        directory,
        &config.output.file_prefix,
        years_label,
        Local::now(),
    );

    let kept: Vec<ArticleRecord> = if config.output.drop_empty {
        report
            .records
            .iter()
            .filter(|r| !r.is_empty_article())
            .cloned()
            .collect()
    } else {
        report.records.clone()
    };

    let summary = RunSummary::new(report, &kept, config_hash);
    if summary.dropped_empty > 0 {
        tracing::info!("Dropped {} empty records", summary.dropped_empty);
    }

    let bias = config.archive.bias;
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![
        Box::new(TabularWriter::create(&paths.records, bias)?),
        Box::new(ErrorLogWriter::create(&paths.errors)?),
    ];

    if let Some(db_path) = &config.output.database_path {
        sinks.push(Box::new(SqliteSink::open(
            Path::new(db_path),
            config_hash,
            report.started_at,
            bias,
        )?));
    }

    for sink in sinks.iter_mut() {
        sink.write_records(&kept)?;
        sink.write_errors(&report.errors)?;
        sink.finalize(&summary)?;
    }

    tracing::info!(
        "Wrote {} records to {} and {} errors to {}",
        kept.len(),
        paths.records.display(),
        report.errors.len(),
        paths.errors.display()
    );

    Ok((paths, summary))
}
