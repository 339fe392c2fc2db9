use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::HttpError;
use crate::har::EntrySource;
use crate::http::{WorkerSession, build_request};
use crate::metrics::{
    Measurement, MeasurementBatch, Stopwatch, TRANSPORT_FAILURE_STATUS, extract_tags,
};
use crate::shutdown::{ShutdownReceiver, shutdown_requested};
use crate::sinks::MetricSink;

use super::config::RunConfig;

/// Why a worker stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStop {
    /// Shutdown was broadcast.
    Cancelled,
    /// The entry sequence was empty, so no pass can run.
    Exhausted,
    /// A descriptor could not be turned into a request.
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker_id: usize,
    /// Completed passes over the entry sequence.
    pub passes: u64,
    /// Measurements produced, including transport failures.
    pub requests: u64,
    pub transport_failures: u64,
    pub flushes: u64,
    pub failed_flushes: u64,
    pub stop: WorkerStop,
}

enum PassEnd {
    Finished,
    Cancelled,
    Aborted(HttpError),
}

/// Replays the entry sequence over its own session until shutdown.
pub struct Worker {
    id: usize,
    config: Arc<RunConfig>,
    entries: Arc<dyn EntrySource>,
    sink: Arc<dyn MetricSink>,
    recording: bool,
    session: WorkerSession,
    batch: MeasurementBatch,
    iteration: u64,
    requests: u64,
    transport_failures: u64,
    flushes: u64,
    failed_flushes: u64,
}

impl Worker {
    /// # Errors
    ///
    /// Returns an error when the worker's HTTP session cannot be built.
    pub fn new(
        id: usize,
        config: Arc<RunConfig>,
        entries: Arc<dyn EntrySource>,
        sink: Arc<dyn MetricSink>,
    ) -> Result<Self, HttpError> {
        let recording = sink.is_recording();
        Ok(Self {
            id,
            config,
            entries,
            sink,
            recording,
            session: WorkerSession::new()?,
            batch: MeasurementBatch::new(),
            iteration: 0,
            requests: 0,
            transport_failures: 0,
            flushes: 0,
            failed_flushes: 0,
        })
    }

    /// Runs passes until shutdown, a build failure, or an empty sequence.
    pub async fn run(mut self, mut shutdown_rx: ShutdownReceiver) -> WorkerSummary {
        if self.entries.entries().is_empty() {
            return self.summary(WorkerStop::Exhausted);
        }

        loop {
            match self.run_pass(&mut shutdown_rx).await {
                PassEnd::Finished => {
                    self.iteration = self.iteration.saturating_add(1);
                }
                PassEnd::Cancelled => {
                    self.flush_pending().await;
                    return self.summary(WorkerStop::Cancelled);
                }
                PassEnd::Aborted(err) => {
                    error!("Worker {} stopped: {}", self.id, err);
                    self.flush_pending().await;
                    return self.summary(WorkerStop::Aborted(err.to_string()));
                }
            }
        }
    }

    async fn run_pass(&mut self, shutdown_rx: &mut ShutdownReceiver) -> PassEnd {
        let entries = Arc::clone(&self.entries);
        for entry in entries.entries() {
            if shutdown_requested(shutdown_rx) {
                return PassEnd::Cancelled;
            }

            let built = build_request(&entry.request, self.config.ignore_har_cookies);
            let mut request = match built {
                Ok(request) => request,
                Err(err) => return PassEnd::Aborted(err),
            };
            self.session.seed_cookies(&mut request);
            let tags = extract_tags(&request, &self.config.tags);
            let url = request.url().to_string();
            let method = request.method().to_string();

            let stopwatch = Stopwatch::start();
            let result = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => return PassEnd::Cancelled,
                result = self.session.dispatch(request) => result,
            };
            let timing = stopwatch.stop();

            let status = match result {
                Ok(status) => {
                    debug!(
                        "[{},{}] {} {} {}ms",
                        self.id, self.iteration, url, status, timing.latency_ms
                    );
                    status
                }
                Err(err) => {
                    error!("[{},{}] {} failed: {}", self.id, self.iteration, url, err);
                    self.transport_failures = self.transport_failures.saturating_add(1);
                    TRANSPORT_FAILURE_STATUS
                }
            };

            self.record(Measurement {
                url,
                status,
                start_time: timing.start_time,
                end_time: timing.end_time,
                latency_ms: timing.latency_ms,
                method,
                har_file: Arc::clone(&self.config.har_file),
                tags,
            })
            .await;
        }

        self.flush_pending().await;
        PassEnd::Finished
    }

    async fn record(&mut self, measurement: Measurement) {
        self.requests = self.requests.saturating_add(1);
        if !self.recording {
            return;
        }
        if let Some(full) = self.batch.push(measurement) {
            self.flush(full).await;
        }
    }

    async fn flush_pending(&mut self) {
        if let Some(rest) = self.batch.take() {
            self.flush(rest).await;
        }
    }

    async fn flush(&mut self, batch: Vec<Measurement>) {
        let size = batch.len();
        debug!(
            "Worker {} writing {} points to {}",
            self.id,
            size,
            self.sink.name()
        );
        self.flushes = self.flushes.saturating_add(1);
        match self.sink.flush(batch).await {
            Ok(report) => {
                if report.skipped > 0 {
                    warn!(
                        "Worker {}: {} of {} points could not be encoded",
                        self.id, report.skipped, size
                    );
                }
            }
            Err(err) => {
                self.failed_flushes = self.failed_flushes.saturating_add(1);
                warn!("Worker {} dropped {} points: {}", self.id, size, err);
            }
        }
    }

    fn summary(&self, stop: WorkerStop) -> WorkerSummary {
        WorkerSummary {
            worker_id: self.id,
            passes: self.iteration,
            requests: self.requests,
            transport_failures: self.transport_failures,
            flushes: self.flushes,
            failed_flushes: self.failed_flushes,
            stop,
        }
    }
}
