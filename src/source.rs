//! Row source: headers, row count, and 1-indexed rows.
//!
//! Everything downstream addresses cells by the column numbers users see in a
//! spreadsheet, starting at 1. Slot 0 is filled in here:
//!
//! | Sequence | Slot 0 | Slots 1..K |
//! |----------|--------|------------|
//! | headers  | `""`   | header row |
//! | row      | zero-padded row number | CSV fields |
//!
//! The row number is padded to the digit count of the total row count, so a
//! 250-row file numbers its rows `001` through `250`.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV file has no header row: {0}")]
    MissingHeaders(PathBuf),
}

/// Raw data rows, without slot 0.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Vec<String>, SourceError>> + 'a>;

/// Sequential tabular input.
///
/// `rows()` may be called more than once; each call restarts from the first
/// data row. Rows are raw fields without slot 0.
pub trait RowSource {
    /// Header row, 1-indexed (slot 0 is empty).
    fn headers(&self) -> &[String];

    /// Number of data rows, not counting the header.
    fn row_count(&self) -> usize;

    fn rows(&self) -> Result<RowIter<'_>, SourceError>;
}

/// One input row, 1-indexed: slot 0 is the zero-padded row number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position of the row in the source (header excluded).
    pub number: usize,
    pub cells: Vec<String>,
}

impl Row {
    /// Build a row from raw fields, prefixing the padded row number.
    pub fn new(number: usize, pad_width: usize, fields: Vec<String>) -> Self {
        let mut cells = Vec::with_capacity(fields.len() + 1);
        cells.push(format!("{number:0pad_width$}"));
        cells.extend(fields);
        Self { number, cells }
    }
}

/// Digit count of `row_count`, used as the row-number padding width.
pub fn pad_width(row_count: usize) -> usize {
    row_count.to_string().len()
}

/// Prefix a raw header row with the empty slot 0.
pub fn one_indexed_headers(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    std::iter::once(String::new()).chain(raw).collect()
}

/// CSV dialect knobs passed through to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

/// CSV file on disk.
///
/// Opening reads the header and counts rows in one pass; every call to
/// [`RowSource::rows`] re-opens the file.
#[derive(Debug)]
pub struct CsvSource {
    path: PathBuf,
    dialect: CsvDialect,
    headers: Vec<String>,
    row_count: usize,
}

impl CsvSource {
    pub fn open(path: &Path, dialect: CsvDialect) -> Result<Self, SourceError> {
        let mut reader = reader(path, dialect)?;

        let mut records = reader.records();
        let header_row = match records.next() {
            Some(record) => record?,
            None => return Err(SourceError::MissingHeaders(path.to_path_buf())),
        };
        let headers = one_indexed_headers(header_row.iter().map(str::to_string));

        let mut row_count = 0;
        for record in records {
            record?;
            row_count += 1;
        }

        Ok(Self {
            path: path.to_path_buf(),
            dialect,
            headers,
            row_count,
        })
    }
}

/// Header handling stays manual so the header row goes through the same
/// dialect and flexible-length rules as data rows.
fn reader(path: &Path, dialect: CsvDialect) -> Result<csv::Reader<std::fs::File>, SourceError> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .from_path(path)?)
}

impl RowSource for CsvSource {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn rows(&self) -> Result<RowIter<'_>, SourceError> {
        let reader = reader(&self.path, self.dialect)?;
        let rows = reader.into_records().skip(1).map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(SourceError::from)
        });
        Ok(Box::new(rows))
    }
}
