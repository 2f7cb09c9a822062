//! Data layer: snapshot types, write points and sinks
//!
//! Points and batches follow the InfluxDB data model. Sinks persist batches;
//! `HttpSink` talks to the InfluxDB 1.x HTTP write API.

mod batch;
mod error;
mod http;
mod line_protocol;
mod point;
mod sink;
mod types;

pub use batch::{BatchConfig, BatchPoints, Precision};
pub use error::{BatchError, PointError, SinkError};
pub use http::HttpSink;
pub use point::{FieldValue, Fields, Point, Tags};
pub use sink::PointSink;
pub use types::{AggregationData, DistributionData, Tag, ViewRow, ViewSnapshot};
