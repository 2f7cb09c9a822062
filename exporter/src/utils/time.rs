//! Time utility functions

use chrono::{DateTime, Utc};

use crate::data::Precision;

/// Convert a timestamp to an integer count of `precision` units since the Unix epoch.
/// Sub-unit remainders are truncated towards negative infinity.
pub fn datetime_to_precision(dt: &DateTime<Utc>, precision: Precision) -> i64 {
    match precision {
        Precision::Nanoseconds => dt.timestamp_nanos_opt().unwrap_or_else(|| {
            tracing::warn!(%dt, "Timestamp out of nanosecond range, using microseconds");
            dt.timestamp_micros().saturating_mul(1_000)
        }),
        Precision::Microseconds => dt.timestamp_micros(),
        Precision::Milliseconds => dt.timestamp_millis(),
        Precision::Seconds => dt.timestamp(),
        Precision::Minutes => dt.timestamp().div_euclid(60),
        Precision::Hours => dt.timestamp().div_euclid(3_600),
    }
}
