//! # influx-exporter
//!
//! Exports aggregated view snapshots (counts, distributions, last values and
//! sums) to InfluxDB. Each call to [`ViewExporter::export_view`] turns one
//! snapshot into one batch of points and writes it with a single request.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use influx_exporter::{ExporterConfig, HttpSink, InfluxExporter, TracingErrorHandler};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ExporterConfig::load(None)?;
//! let sink = Arc::new(HttpSink::from_config(&config)?);
//! let exporter = InfluxExporter::from_config(&config, sink, Arc::new(TracingErrorHandler));
//! # let _ = exporter;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod domain;
pub mod utils;

pub use crate::core::{ExporterConfig, NamingPolicy};
pub use data::{
    AggregationData, BatchConfig, BatchPoints, DistributionData, FieldValue, HttpSink, Point,
    PointSink, Precision, SinkError, Tag, ViewRow, ViewSnapshot,
};
pub use domain::{ErrorHandler, ExportError, InfluxExporter, TracingErrorHandler, ViewExporter};
