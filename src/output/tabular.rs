//! Comma-separated record and error-log writers

use crate::output::stats::RunSummary;
use crate::output::traits::{OutputResult, RecordSink};
use crate::results::{ArticleRecord, CrawlError};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column header; the leading blank column holds the row index
pub const HEADER: &str = ",link,title,article,publisher,bias,topic,year,month,day,characters,comments";

/// Wraps a cell in double quotes, doubling any embedded quote
///
/// # Example
///
/// ```
/// use sitemap_harvest::output::quote_cell;
///
/// assert_eq!(quote_cell(r#"Say "hi""#), r#""Say ""hi""""#);
/// ```
pub fn quote_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Reverses [`quote_cell`]; values that are not quoted come back unchanged
pub fn unquote_cell(value: &str) -> String {
    match value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => value.to_string(),
    }
}

/// Quotes a cell only when it holds a separator, quote or line break
pub fn escape_cell(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(quote_cell(value))
    } else {
        Cow::Borrowed(value)
    }
}

/// Formats one record as a row, without the trailing newline
///
/// The title is already quoted at extraction time; the body is always quoted
/// here and every other text cell only when it needs to be.
pub fn format_row(index: usize, record: &ArticleRecord, bias: i32) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{}",
        index,
        escape_cell(&record.url),
        record.title,
        quote_cell(&record.body),
        escape_cell(&record.publisher),
        bias,
        escape_cell(&record.topic),
        escape_cell(&record.year),
        escape_cell(&record.month),
        escape_cell(&record.day),
        record.character_count,
        record.validity.comment()
    )
}

/// Writes article records as rows under [`HEADER`]
pub struct TabularWriter<W: Write> {
    out: W,
    bias: i32,
    next_index: usize,
}

impl TabularWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path` and writes the header
    pub fn create(path: &Path, bias: i32) -> OutputResult<Self> {
        Self::new(BufWriter::new(File::create(path)?), bias)
    }
}

impl<W: Write> TabularWriter<W> {
    pub fn new(mut out: W, bias: i32) -> OutputResult<Self> {
        writeln!(out, "{}", HEADER)?;
        Ok(Self {
            out,
            bias,
            next_index: 0,
        })
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for TabularWriter<W> {
    fn write_records(&mut self, records: &[ArticleRecord]) -> OutputResult<()> {
        let mut ordered: Vec<&ArticleRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.sequence_number);

        for record in ordered {
            writeln!(self.out, "{}", format_row(self.next_index, record, self.bias))?;
            self.next_index += 1;
        }
        Ok(())
    }

    fn write_errors(&mut self, _errors: &[CrawlError]) -> OutputResult<()> {
        Ok(())
    }

    fn finalize(&mut self, _summary: &RunSummary) -> OutputResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Writes one `<STAGE> error at <url>: <message>` line per failure
pub struct ErrorLogWriter<W: Write> {
    out: W,
}

impl ErrorLogWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> ErrorLogWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for ErrorLogWriter<W> {
    fn write_records(&mut self, _records: &[ArticleRecord]) -> OutputResult<()> {
        Ok(())
    }

    fn write_errors(&mut self, errors: &[CrawlError]) -> OutputResult<()> {
        for error in errors {
            writeln!(self.out, "{}", error)?;
        }
        Ok(())
    }

    fn finalize(&mut self, _summary: &RunSummary) -> OutputResult<()> {
        self.out.flush()?;
        Ok(())
    }
}
