//! View snapshot types
//!
//! Immutable records handed over by the metrics-collection layer, one per
//! registered view per reporting interval.

use chrono::{DateTime, Utc};

/// A single tag key/value pair attached to a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Distribution statistics accumulated for one row
///
/// Only `min`, `max`, `mean` and `count` are exported; the remaining
/// statistics are carried so snapshots can be passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionData {
    pub count: i64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum_of_squared_dev: f64,
    pub bucket_counts: Vec<i64>,
}

/// Aggregated value for one row of a view
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationData {
    /// Number of recorded observations
    Count { value: i64 },
    /// Summary statistics of recorded observations
    Distribution(DistributionData),
    /// Most recent observation
    LastValue { value: f64 },
    /// Running total of observations
    Sum { value: f64 },
    /// Aggregation kind produced by a newer collection layer.
    /// Exporting a snapshot that contains one is a contract violation.
    Unrecognized { kind: String },
}

impl AggregationData {
    pub fn kind(&self) -> &str {
        match self {
            Self::Count { .. } => "count",
            Self::Distribution(_) => "distribution",
            Self::LastValue { .. } => "last_value",
            Self::Sum { .. } => "sum",
            Self::Unrecognized { kind } => kind,
        }
    }
}

/// One tag combination within a view, with its aggregated value
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    pub tags: Vec<Tag>,
    pub data: AggregationData,
}

impl ViewRow {
    pub fn new(tags: Vec<Tag>, data: AggregationData) -> Self {
        Self { tags, data }
    }
}

/// Rows accumulated for one view when its collection window closed
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub view_name: String,
    pub rows: Vec<ViewRow>,
    /// Moment the window was closed; used as the timestamp of every point
    pub end: DateTime<Utc>,
}

impl ViewSnapshot {
    pub fn new(view_name: impl Into<String>, rows: Vec<ViewRow>, end: DateTime<Utc>) -> Self {
        Self {
            view_name: view_name.into(),
            rows,
            end,
        }
    }
}
