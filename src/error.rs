//! Error taxonomy for the aggregation pipeline.
//!
//! Two families of failure exist and both are non-fatal for an aggregation
//! call: a `ParseError` drops the offending record, a `FetchError` degrades
//! the affected result window to empty. Nothing here ever escapes
//! `MatchAggregator::aggregate`.

use thiserror::Error;

/// A provider date/time string could not be turned into a canonical instant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unrecognized date/time shape: {0:?}")]
    UnrecognizedShape(String),

    #[error("non-numeric {field} in {input:?}")]
    NonNumericField { field: &'static str, input: String },

    #[error("{field} out of range ({value}) in {input:?}")]
    FieldOutOfRange {
        field: &'static str,
        value: u32,
        input: String,
    },

    /// Field values that pass individual range checks but do not form a
    /// real calendar date (e.g. Feb 30), or fall into a zone gap.
    #[error("no such instant in zone: {0:?}")]
    InvalidInstant(String),
}

/// An upstream result-set fetch failed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("fetch timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
}

impl FetchError {
    /// HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status } => Some(*status),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::FieldOutOfRange {
            field: "month",
            value: 13,
            input: "20251301000000".to_string(),
        };
        assert!(err.to_string().contains("month"));
        assert!(err.to_string().contains("13"));
    }

    #[test]
    fn test_fetch_error_status_code() {
        let err = FetchError::Status { status: 503 };
        assert_eq!(err.status_code(), Some(503));

        let err = FetchError::Timeout { elapsed_ms: 5000 };
        assert_eq!(err.status_code(), None);
    }
}
