//! View export pipeline
//!
//! Translates view snapshots into write points, batches them and hands the
//! batch to a sink. Failures are reported through an injected handler.

mod error;
mod exporter;
mod handler;
mod translate;

pub use error::ExportError;
pub use exporter::{InfluxExporter, ViewExporter};
pub use handler::{ErrorHandler, TracingErrorHandler};
