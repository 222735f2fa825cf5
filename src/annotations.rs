//! Streaming reader for the annotations table
//!
//! Rows are decoded one at a time so the export loop can stop reading as soon
//! as it has enough samples.

use crate::{
    captions::first_caption,
    config::Split,
    error::{PrepareError, Result},
};
use csv::{Reader, StringRecord};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Columns every annotations table must have
pub const REQUIRED_COLUMNS: [&str; 3] = ["split", "filename", "raw"];

/// One row of the annotations table; other columns are ignored
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnnotationRow {
    pub split: String,
    pub filename: String,
    pub raw: String,
}

impl AnnotationRow {
    /// Exact, case-sensitive split match
    #[must_use]
    pub fn is_split(&self, split: Split) -> bool {
        self.split == split.as_str()
    }

    /// Filename with surrounding whitespace removed
    #[must_use]
    pub fn image_name(&self) -> &str {
        self.filename.trim()
    }
}

/// A decoded row and the table line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub line: u64,
    pub row: AnnotationRow,
}

impl AnnotationRecord {
    /// First caption of the row, attributed to this record's line on error
    pub fn caption(&self) -> Result<String> {
        first_caption(&self.row.raw)
            .map_err(|e| PrepareError::caption_syntax(self.line, e.to_string()))
    }
}

/// Annotations table opened for streaming
pub struct AnnotationTable {
    path: PathBuf,
    reader: Reader<File>,
    headers: StringRecord,
    record: StringRecord,
}

impl AnnotationTable {
    /// Open the table and check its header row
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|e| PrepareError::file_io_error("open annotations", &path, &e))?;
        let mut reader = Reader::from_reader(file);
        let headers = reader.headers()?.clone();

        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(PrepareError::MissingColumn {
                    path,
                    column: column.to_string(),
                });
            }
        }

        Ok(Self {
            path,
            reader,
            headers,
            record: StringRecord::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the next row, or `None` at end of table
    pub fn next_record(&mut self) -> Result<Option<AnnotationRecord>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        let line = self.record.position().map_or(0, csv::Position::line);
        let row: AnnotationRow = self.record.deserialize(Some(&self.headers))?;
        Ok(Some(AnnotationRecord { line, row }))
    }

    /// Next row whose split matches `split`
    pub fn next_in_split(&mut self, split: Split) -> Result<Option<AnnotationRecord>> {
        while let Some(record) = self.next_record()? {
            if record.row.is_split(split) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

impl Iterator for AnnotationTable {
    type Item = Result<AnnotationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
