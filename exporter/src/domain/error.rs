//! Export error taxonomy
//!
//! Every failure of an export call is delivered to the installed
//! [`ErrorHandler`](super::ErrorHandler) as one of these.

use thiserror::Error;

use crate::data::{BatchError, PointError, SinkError};

#[derive(Error, Debug)]
pub enum ExportError {
    /// Batch could not be created; nothing was exported
    #[error("invalid batch: {0}")]
    InvalidBatch(#[from] BatchError),

    /// Row carried an aggregation kind the exporter cannot translate;
    /// nothing was exported
    #[error("unknown aggregation type: {kind}")]
    UnknownAggregation { kind: String },

    /// One row was dropped; the rest of the batch was still written
    #[error("invalid point for view {view}: {source}")]
    InvalidPoint {
        view: String,
        #[source]
        source: PointError,
    },

    /// Sink failed to persist the batch
    #[error("write to database {database} failed: {source}")]
    Write {
        database: String,
        #[source]
        source: SinkError,
    },
}

impl ExportError {
    pub fn unknown_aggregation(kind: impl Into<String>) -> Self {
        Self::UnknownAggregation { kind: kind.into() }
    }

    pub fn invalid_point(view: impl Into<String>, source: PointError) -> Self {
        Self::InvalidPoint {
            view: view.into(),
            source,
        }
    }

    pub fn write(database: impl Into<String>, source: SinkError) -> Self {
        Self::Write {
            database: database.into(),
            source,
        }
    }

    /// Whether the whole export call was abandoned because of this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidBatch(_) | Self::UnknownAggregation { .. }
        )
    }
}
