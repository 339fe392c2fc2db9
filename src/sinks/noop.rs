use async_trait::async_trait;

use crate::error::SinkError;
use crate::metrics::Measurement;

use super::port::{FlushReport, MetricSink};

/// Sink used when metrics are disabled: batches are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl MetricSink for NoopSink {
    fn name(&self) -> &'static str {
        "no-op"
    }

    fn is_recording(&self) -> bool {
        false
    }

    async fn provision(&self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn flush(&self, batch: Vec<Measurement>) -> Result<FlushReport, SinkError> {
        drop(batch);
        Ok(FlushReport::default())
    }
}
