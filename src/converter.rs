//! KairosDB query-response to CSV converter.
//!
//! This module provides the main `CsvConverter` type, which ties the
//! streaming parser to the row emitter.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ConverterConfig;
use crate::emitter::RowEmitter;
use crate::error::{Error, Result};
use crate::groups::resolve_columns;
use crate::parser::QueryResponseParser;

/// Prefix of the output files created by [`CsvConverter::process_query_results`].
pub const OUTPUT_PREFIX: &str = "kairosdb-csv-plugin";

/// Counts reported by a finished conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Query results read from the input.
    pub results: u64,
    /// Data rows written, not counting the header.
    pub rows: u64,
    /// Whether the header line was written.
    pub header_written: bool,
}

/// Converts KairosDB query responses to CSV.
///
/// Each conversion owns its reader, writer and emitter, so one converter can
/// be shared between threads converting different files.
///
/// # Example
///
/// ```
/// use kairos_csv::CsvConverter;
///
/// let json = r#"{"queries": [{"results": [{
///     "name": "cpu",
///     "group_by": [{"name": "tag", "tags": ["host"], "group": {"host": "web-1"}}],
///     "values": [[1000, 42]]
/// }]}]}"#;
///
/// let mut csv = Vec::new();
/// CsvConverter::new().convert(json.as_bytes(), &mut csv).unwrap();
/// assert_eq!(
///     String::from_utf8(csv).unwrap(),
///     "Metric Name,Timestamp,Value,host\ncpu,01/01/1970 00:00:01:000,42,web-1\n"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct CsvConverter {
    config: ConverterConfig,
}

impl CsvConverter {
    /// Create a converter with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter from a configuration, validating it first.
    pub fn with_config(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Whether the `Metric Name` column is written.
    pub fn show_metric_name(&self) -> bool {
        self.config.show_metric_name
    }

    /// Enable or disable the `Metric Name` column.
    pub fn set_show_metric_name(&mut self, show_metric_name: bool) {
        self.config.show_metric_name = show_metric_name;
    }

    /// Convert the query response read from `input` into CSV on `output`.
    ///
    /// Output is flushed after each query result. On error, whatever was
    /// already written to `output` is incomplete and should be discarded.
    pub fn convert<R: Read, W: Write>(&self, input: R, output: W) -> Result<ConversionSummary> {
        let mut parser = QueryResponseParser::new(input);
        let mut emitter = RowEmitter::new(output, self.config.show_metric_name);

        while let Some(result) = parser.next()? {
            let mut columns = resolve_columns(&result.group_by);
            if let Some(transform) = &self.config.tag_transform {
                transform.apply(&mut columns);
            }

            emitter.emit_header_if_first(&columns)?;
            let rows = emitter.emit_rows(&result, &columns)?;
            debug!(metric = %result.name, rows, tags = columns.len(), "wrote query result");
        }

        let summary = ConversionSummary {
            results: parser.results_parsed(),
            rows: emitter.rows_written(),
            header_written: emitter.header_written(),
        };
        parser.finish()?;
        emitter.finish()?;

        info!(results = summary.results, rows = summary.rows, "conversion complete");
        Ok(summary)
    }

    /// Convert `input` into the file at `output`.
    ///
    /// The CSV is written to a temporary file next to `output` and only moved
    /// into place once the conversion succeeded.
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<ConversionSummary> {
        let reader = File::open(input)?;
        let mut staged = tempfile::Builder::new()
            .prefix(OUTPUT_PREFIX)
            .suffix(".csv")
            .tempfile_in(parent_dir(output))?;

        let summary = self
            .convert(reader, staged.as_file_mut())
            .map_err(|e| Error::InvalidQueryResults { source: Box::new(e) })?;

        staged.persist(output).map_err(|e| Error::Io(e.error))?;
        Ok(summary)
    }

    /// Convert the query response file at `input` into a new CSV file created
    /// in the same directory, returning its path.
    ///
    /// If the conversion fails the new file is removed and
    /// [`Error::InvalidQueryResults`] is returned.
    pub fn process_query_results(&self, input: &Path) -> Result<PathBuf> {
        let reader = File::open(input)?;
        let mut output = tempfile::Builder::new()
            .prefix(OUTPUT_PREFIX)
            .suffix(".csv")
            .tempfile_in(parent_dir(input))?;

        self.convert(reader, output.as_file_mut())
            .map_err(|e| Error::InvalidQueryResults { source: Box::new(e) })?;

        let (_, path) = output.keep().map_err(|e| Error::Io(e.error))?;
        Ok(path)
    }
}

/// Directory containing `path`, or the working directory for bare file names.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{CaseAction, TagTransform};

    fn convert(converter: &CsvConverter, json: &str) -> String {
        let mut out = Vec::new();
        converter.convert(json.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_defaults() {
        let converter = CsvConverter::new();
        assert!(converter.show_metric_name());
        assert!(converter.config().tag_transform.is_none());
    }

    #[test]
    fn test_toggle_metric_name() {
        let mut converter = CsvConverter::new();
        converter.set_show_metric_name(false);
        let csv = convert(
            &converter,
            r#"{"queries": [{"results": [{"name": "m", "values": [[0, 1]]}]}]}"#,
        );
        assert_eq!(csv, "Timestamp,Value\n01/01/1970 00:00:00:000,1\n");
    }

    #[test]
    fn test_tag_transform_applied() {
        let converter = CsvConverter::with_config(ConverterConfig {
            show_metric_name: true,
            tag_transform: Some(TagTransform::new(CaseAction::Uppercase, ["env"])),
        })
        .unwrap();
        let csv = convert(
            &converter,
            r#"{"queries": [{"results": [{
                "name": "m",
                "group_by": [{"name": "tag", "group": {"env": "prod", "svc": "api"}}],
                "values": [[0, 1]]
            }]}]}"#,
        );
        assert_eq!(
            csv,
            "Metric Name,Timestamp,Value,env,svc\nm,01/01/1970 00:00:00:000,1,PROD,api\n"
        );
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let err = CsvConverter::with_config(ConverterConfig {
            show_metric_name: true,
            tag_transform: Some(TagTransform::default()),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_summary() {
        let mut out = Vec::new();
        let summary = CsvConverter::new()
            .convert(
                r#"{"queries": [{"results": [
                    {"name": "a", "values": [[0, 1], [1, 2]]},
                    {"name": "b", "values": []}
                ]}]}"#
                    .as_bytes(),
                &mut out,
            )
            .unwrap();
        assert_eq!(
            summary,
            ConversionSummary {
                results: 2,
                rows: 2,
                header_written: true,
            }
        );
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("out.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/tmp/out.json")), Path::new("/tmp"));
    }
}
