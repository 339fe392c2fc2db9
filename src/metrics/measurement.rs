use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::tags::Tags;

/// Status recorded when no HTTP response was received.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Performance record for one executed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub url: String,
    pub status: u16,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub latency_ms: u64,
    pub method: String,
    pub har_file: Arc<str>,
    pub tags: Tags,
}

impl Measurement {
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        self.status == TRANSPORT_FAILURE_STATUS
    }
}

/// Wall-clock and monotonic start of a request.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Stopwatch {
    #[must_use]
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn stop(self) -> RequestTiming {
        let elapsed = self.started.elapsed();
        RequestTiming {
            start_time: self.started_at,
            end_time: Utc::now(),
            latency_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Start/end timestamps and latency truncated to whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTiming {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub latency_ms: u64,
}
