//! Error types for kairos-csv.

use thiserror::Error;

/// Error type for kairos-csv operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not well-formed JSON, or does not have the shape of a
    /// query response at the point where it was inspected.
    #[error("Malformed input: {message}")]
    Malformed {
        /// Description of what was wrong with the input.
        message: String,
    },

    /// The cursor was asked to consume a token that is not the next one.
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// Token the caller tried to consume.
        expected: String,
        /// Token actually present in the input.
        found: String,
    },

    /// The converter configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The configuration file is not valid JSON or does not match the
    /// configuration schema.
    #[error("Failed to parse configuration: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A file-level conversion failed; the partial output has been discarded.
    #[error("Query results are invalid: {source}")]
    InvalidQueryResults {
        /// The failure that aborted the conversion.
        #[source]
        source: Box<Error>,
    },

    /// The CSV writer rejected a record.
    #[error("CSV write error: {0}")]
    Csv(String),

    /// I/O error while reading the input or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::Malformed`] from anything displayable, such as the
    /// errors raised by the underlying JSON reader.
    pub(crate) fn malformed(message: impl std::fmt::Display) -> Self {
        Error::Malformed {
            message: message.to_string(),
        }
    }

    /// Returns true if this error means the input could not be understood.
    pub fn is_malformed(&self) -> bool {
        match self {
            Error::Malformed { .. } | Error::UnexpectedToken { .. } => true,
            Error::InvalidQueryResults { source } => source.is_malformed(),
            _ => false,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return Error::Csv(err.to_string());
        }
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            kind => Error::Csv(format!("{:?}", kind)),
        }
    }
}

/// Result type alias for kairos-csv operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_query_results_message() {
        let err = Error::InvalidQueryResults {
            source: Box::new(Error::malformed("unexpected end of input")),
        };
        assert_eq!(
            err.to_string(),
            "Query results are invalid: Malformed input: unexpected end of input"
        );
        assert!(err.is_malformed());
    }

    #[test]
    fn test_io_is_not_malformed() {
        let err = Error::from(std::io::Error::other("disk full"));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_csv_io_failure_is_io() {
        let err = Error::from(csv::Error::from(std::io::Error::other("pipe closed")));
        assert!(matches!(err, Error::Io(_)));
    }
}
