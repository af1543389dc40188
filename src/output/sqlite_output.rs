//! SQLite record sink
//!
//! Persists one run, its article rows and its error rows. Unlike the CSV
//! output this keeps the author byline and stores the title unquoted.

use crate::output::stats::RunSummary;
use crate::output::tabular::unquote_cell;
use crate::output::traits::{OutputResult, RecordSink};
use crate::results::{ArticleRecord, CrawlError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQL schema for the harvest database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    aborted INTEGER NOT NULL DEFAULT 0,
    records_written INTEGER,
    dropped_empty INTEGER
);

-- Extracted articles
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    sequence_number INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    author TEXT,
    body TEXT NOT NULL,
    publisher TEXT NOT NULL,
    bias INTEGER NOT NULL,
    topic TEXT NOT NULL,
    year TEXT NOT NULL,
    month TEXT NOT NULL,
    day TEXT NOT NULL,
    characters INTEGER NOT NULL,
    validity TEXT NOT NULL,
    UNIQUE(run_id, sequence_number)
);

CREATE INDEX IF NOT EXISTS idx_articles_run ON articles(run_id);
CREATE INDEX IF NOT EXISTS idx_articles_topic ON articles(topic, year, month);

-- Recorded failures
CREATE TABLE IF NOT EXISTS crawl_errors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    stage TEXT NOT NULL,
    url TEXT NOT NULL,
    message TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_errors_run ON crawl_errors(run_id);
CREATE INDEX IF NOT EXISTS idx_crawl_errors_stage ON crawl_errors(stage);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// SQLite-backed record sink
pub struct SqliteSink {
    conn: Connection,
    run_id: i64,
    bias: i32,
}

impl SqliteSink {
    /// Opens (or creates) the database at `path` and registers a new run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration that produced the run
    /// * `started_at` - When the run began
    /// * `bias` - Bias score written on every article row
    pub fn open(
        path: &Path,
        config_hash: &str,
        started_at: DateTime<Utc>,
        bias: i32,
    ) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Self::with_connection(conn, config_hash, started_at, bias)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory(config_hash: &str, bias: i32) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, config_hash, Utc::now(), bias)
    }

    fn with_connection(
        conn: Connection,
        config_hash: &str,
        started_at: DateTime<Utc>,
        bias: i32,
    ) -> OutputResult<Self> {
        initialize_schema(&conn)?;
        conn.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![started_at.to_rfc3339(), config_hash],
        )?;
        let run_id = conn.last_insert_rowid();

        Ok(Self { conn, run_id, bias })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    #[cfg(test)]
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordSink for SqliteSink {
    fn write_records(&mut self, records: &[ArticleRecord]) -> OutputResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO articles (run_id, sequence_number, url, title, author, body,
                    publisher, bias, topic, year, month, day, characters, validity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;

            for record in records {
                stmt.execute(params![
                    self.run_id,
                    record.sequence_number as i64,
                    record.url,
                    unquote_cell(&record.title),
                    record.author,
                    record.body,
                    record.publisher,
                    self.bias,
                    record.topic,
                    record.year,
                    record.month,
                    record.day,
                    record.character_count as i64,
                    record.validity.to_db_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_errors(&mut self, errors: &[CrawlError]) -> OutputResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO crawl_errors (run_id, stage, url, message) VALUES (?1, ?2, ?3, ?4)",
            )?;

            for error in errors {
                stmt.execute(params![
                    self.run_id,
                    error.stage.to_db_string(),
                    error.url,
                    error.message,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finalize(&mut self, summary: &RunSummary) -> OutputResult<()> {
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, aborted = ?2, records_written = ?3, dropped_empty = ?4
             WHERE id = ?5",
            params![
                summary.finished_at.to_rfc3339(),
                summary.aborted,
                summary.records_written as i64,
                summary.dropped_empty as i64,
                self.run_id,
            ],
        )?;
        Ok(())
    }
}
