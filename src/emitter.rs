//! CSV row emission.
//!
//! The header is fixed by the first result written: its tag names become the
//! dynamic columns for the rest of the file. Fields are separated by
//! [`DELIMITER`] and never quoted, so a delimiter inside a metric name or tag
//! value shifts the row.

use std::io::Write;

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::Result;
use crate::types::{QueryResult, ResolvedColumns};

/// Field separator.
pub const DELIMITER: u8 = b',';

/// Timestamp pattern: month/day/year hour:minute:second:millisecond.
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S:%3f";

/// Format epoch milliseconds as `MM/DD/YYYY HH:MM:SS:mmm` in UTC.
///
/// Timestamps outside the representable calendar range are written as the
/// raw millisecond count.
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(t) => t.format(TIMESTAMP_FORMAT).to_string(),
        None => millis.to_string(),
    }
}

/// Writes the header and data rows of one conversion.
pub struct RowEmitter<W: Write> {
    writer: csv::Writer<W>,
    show_metric_name: bool,
    header: Option<Vec<String>>,
    rows_written: u64,
}

impl<W: Write> RowEmitter<W> {
    /// Create an emitter writing to `writer`.
    pub fn new(writer: W, show_metric_name: bool) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .buffer_capacity(64 * 1024)
            .from_writer(writer);
        Self {
            writer,
            show_metric_name,
            header: None,
            rows_written: 0,
        }
    }

    /// Write the header unless one has already been written.
    ///
    /// Returns true if this call wrote it.
    pub fn emit_header_if_first(&mut self, columns: &ResolvedColumns) -> Result<bool> {
        if self.header.is_some() {
            return Ok(false);
        }

        let names: Vec<String> = columns.tag_names().map(str::to_string).collect();

        if self.show_metric_name {
            self.writer.write_field("Metric Name")?;
        }
        self.writer.write_field("Timestamp")?;
        self.writer.write_field("Value")?;
        for name in &names {
            self.writer.write_field(name)?;
        }
        self.writer.write_record(None::<&[u8]>)?;

        self.header = Some(names);
        Ok(true)
    }

    /// Write one row per data point of `result`, then flush.
    ///
    /// Tag values are looked up by the header's tag names: a name the result
    /// does not have yields an empty field, and tags outside the header are
    /// dropped.
    pub fn emit_rows(&mut self, result: &QueryResult, columns: &ResolvedColumns) -> Result<usize> {
        let tag_values: Vec<&str> = match &self.header {
            Some(names) => names
                .iter()
                .map(|name| columns.get(name).unwrap_or_default())
                .collect(),
            None => columns.iter().map(|(_, value)| value).collect(),
        };

        for point in &result.data_points {
            if self.show_metric_name {
                self.writer.write_field(&result.name)?;
            }
            self.writer.write_field(format_timestamp(point.timestamp))?;
            self.writer.write_field(point.value.to_string())?;
            for value in &tag_values {
                self.writer.write_field(value)?;
            }
            self.writer.write_record(None::<&[u8]>)?;
        }

        self.rows_written += result.data_points.len() as u64;
        self.writer.flush()?;
        Ok(result.data_points.len())
    }

    /// Returns true once the header has been written.
    pub fn header_written(&self) -> bool {
        self.header.is_some()
    }

    /// Tag names of the header, if it has been written.
    pub fn header_tag_names(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Number of data rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error().into())
    }
}
