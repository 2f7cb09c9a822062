//! Error handler capability
//!
//! Export calls never return errors; they report them here. Handlers must not
//! block and must not panic.

use super::error::ExportError;

/// Receiver for failures reported during an export call
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, error: ExportError);
}

impl<F> ErrorHandler for F
where
    F: Fn(ExportError) + Send + Sync,
{
    fn handle(&self, error: ExportError) {
        self(error)
    }
}

/// Logs every reported error through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
    fn handle(&self, error: ExportError) {
        tracing::error!(error = %error, fatal = error.is_fatal(), "View export failed");
    }
}
