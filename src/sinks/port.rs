use async_trait::async_trait;

use crate::error::SinkError;
use crate::metrics::Measurement;

/// Outcome of a successful flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub written: usize,
    /// Measurements that could not be encoded and were left out.
    pub skipped: usize,
}

#[async_trait]
pub trait MetricSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether flushed batches are persisted anywhere.
    fn is_recording(&self) -> bool {
        true
    }

    /// Prepares the store for writes. Must be idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error when the store is unreachable or refuses setup.
    async fn provision(&self) -> Result<(), SinkError>;

    /// Writes one batch. A single call is atomic with respect to `batch`.
    ///
    /// # Errors
    ///
    /// Returns an error when the batch could not be transmitted; the batch is
    /// lost in that case.
    async fn flush(&self, batch: Vec<Measurement>) -> Result<FlushReport, SinkError>;
}
