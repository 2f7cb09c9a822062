//! Sink trait for batch writes
//!
//! A sink persists one batch per call. Implementations must be safe to share
//! across tasks; the exporter holds them behind an `Arc`.

use async_trait::async_trait;

use super::batch::BatchPoints;
use super::error::SinkError;

/// Destination for batched points
#[async_trait]
pub trait PointSink: Send + Sync {
    /// Persist all points of the batch in one write
    async fn write(&self, batch: &BatchPoints) -> Result<(), SinkError>;
}
