//! # kairos-csv
//!
//! Streaming converter from KairosDB query-response JSON to CSV that handles
//! result files far larger than memory.
//!
//! ## Why?
//!
//! Query responses are deeply nested and can be huge. Deserializing one into
//! a tree before writing CSV means holding every data point in memory:
//!
//! ```ignore
//! // This will OOM with millions of data points!
//! let response: serde_json::Value = serde_json::from_reader(file)?;
//! ```
//!
//! `kairos-csv` walks the document token by token and decodes only one query
//! result at a time:
//!
//! ```ignore
//! let mut parser = QueryResponseParser::new(file);
//! while let Some(result) = parser.next()? {
//!     process(result);
//! }
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use kairos_csv::CsvConverter;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = CsvConverter::new();
//!     let csv = converter.process_query_results(Path::new("/tmp/query-response.json"))?;
//!     println!("wrote {}", csv.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Output
//!
//! ```text
//! Metric Name,Timestamp,Value,env,svc
//! app.requests,01/01/1970 00:00:01:000,5,prod,api
//! app.requests,01/01/1970 00:00:02:000,7.5,prod,api
//! ```
//!
//! - One row per data point, in source order
//! - Tag columns come from the `tag` group-by of the first result, sorted by name
//! - Timestamps are UTC, `MM/DD/YYYY HH:MM:SS:mmm`
//! - Values that are not numbers are written as `0`
//! - Fields are never quoted

pub mod config;
pub mod converter;
pub mod cursor;
pub mod decoder;
pub mod emitter;
pub mod error;
pub mod groups;
pub mod parser;
pub mod transform;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use config::ConverterConfig;
pub use converter::{ConversionSummary, CsvConverter};
pub use error::{Error, Result};
pub use transform::{CaseAction, TagTransform};
pub use types::{DataPoint, GroupDescriptor, QueryResult, ResolvedColumns};
pub use value::DataPointValue;

// Re-export building blocks for advanced use cases
pub use cursor::{ScalarKind, Token, TokenCursor};
pub use emitter::{RowEmitter, format_timestamp};
pub use groups::resolve_columns;
pub use parser::QueryResponseParser;
