use std::sync::Arc;

use tracing::{info, warn};

use super::noop::NoopSink;
use super::port::MetricSink;

/// Provisions `candidate` once and returns it, or a [`NoopSink`] when it is
/// unavailable.
pub async fn select_sink(candidate: Arc<dyn MetricSink>) -> Arc<dyn MetricSink> {
    match candidate.provision().await {
        Ok(()) => {
            if candidate.is_recording() {
                info!("Recording results to {}", candidate.name());
            }
            candidate
        }
        Err(err) => {
            warn!(
                "Could not connect to {}: {}. No test results will be recorded.",
                candidate.name(),
                err
            );
            Arc::new(NoopSink)
        }
    }
}
