use std::sync::Arc;
use std::time::Duration;

use crate::metrics::TagSpec;
use crate::sinks::InfluxConfig;

/// Immutable settings for one load test.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub workers: usize,
    /// Upper bound on how long the coordinator waits.
    pub duration: Duration,
    pub ignore_har_cookies: bool,
    pub tags: TagSpec,
    /// Capture identifier attached to every measurement.
    pub har_file: Arc<str>,
    /// `None` runs without recording metrics.
    pub sink: Option<InfluxConfig>,
}

impl RunConfig {
    #[must_use]
    pub fn new(workers: usize, duration: Duration, har_file: &str) -> Self {
        Self {
            workers,
            duration,
            ignore_har_cookies: false,
            tags: TagSpec::default(),
            har_file: Arc::from(har_file),
            sink: None,
        }
    }
}
