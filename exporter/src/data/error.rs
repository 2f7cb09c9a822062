//! Error types for points, batches and sinks

use thiserror::Error;

/// Point rejected at construction time
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PointError {
    #[error("point is missing a measurement name")]
    MissingName,

    #[error("point is missing fields")]
    MissingFields,

    #[error("tag key must not be empty")]
    EmptyTagKey,

    #[error("field key must not be empty")]
    EmptyFieldKey,

    #[error("'{0}' is a reserved key")]
    ReservedKey(String),

    #[error("invalid field '{key}': {value} is unsupported")]
    NonFiniteField { key: String, value: f64 },

    #[error("'{0}' ends with a backslash")]
    TrailingBackslash(String),

    #[error("series key of '{name}' is {len} bytes, max is {max}")]
    KeyTooLong { name: String, len: usize, max: usize },

    #[error("timestamp {0} is outside the nanosecond range")]
    TimestampOutOfRange(String),
}

/// Batch rejected at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("database name must not be empty")]
    EmptyDatabase,

    #[error("invalid database name: {0:?}")]
    InvalidDatabase(String),

    #[error("invalid time precision: {0:?}")]
    InvalidPrecision(String),
}

/// Failure reported by a sink while writing a batch
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Write rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid sink URL: {0}")]
    InvalidUrl(String),
}

impl SinkError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether a caller-side retry could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl(_) => false,
        }
    }
}
