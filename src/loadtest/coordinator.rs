use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::har::EntrySource;
use crate::shutdown::{ShutdownSender, shutdown_channel};
use crate::sinks::{InfluxSink, MetricSink, NoopSink, select_sink};

use super::config::RunConfig;
use super::worker::{Worker, WorkerSummary};

/// Time workers get to finish their in-flight request and flush after
/// shutdown is broadcast. Workers still running afterwards are aborted.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Starting,
    Running,
    Completed,
    TimedOut,
    Interrupted,
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every worker returned before the deadline.
    Completed,
    /// The configured duration elapsed.
    TimedOut,
    /// An external shutdown (signal) arrived first.
    Interrupted,
}

impl From<RunOutcome> for RunState {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => Self::Completed,
            RunOutcome::TimedOut => Self::TimedOut,
            RunOutcome::Interrupted => Self::Interrupted,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadTestReport {
    pub outcome: RunOutcome,
    /// Summaries of workers that returned; aborted workers are missing.
    pub workers: Vec<WorkerSummary>,
    pub elapsed: Duration,
    pub recording: bool,
}

impl LoadTestReport {
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.workers
            .iter()
            .fold(0u64, |acc, worker| acc.saturating_add(worker.requests))
    }

    #[must_use]
    pub fn total_transport_failures(&self) -> u64 {
        self.workers
            .iter()
            .fold(0u64, |acc, worker| acc.saturating_add(worker.transport_failures))
    }
}

/// Starts the workers, bounds the run by its duration, and stops them.
pub struct Coordinator {
    config: Arc<RunConfig>,
    entries: Arc<dyn EntrySource>,
    state: RunState,
    external: Option<ShutdownSender>,
}

impl Coordinator {
    #[must_use]
    pub fn new(config: RunConfig, entries: Arc<dyn EntrySource>) -> Self {
        Self {
            config: Arc::new(config),
            entries,
            state: RunState::Starting,
            external: None,
        }
    }

    /// Also stops the run when `external` broadcasts, e.g. on Ctrl+C.
    #[must_use]
    pub fn with_shutdown(mut self, external: ShutdownSender) -> Self {
        self.external = Some(external);
        self
    }

    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs the test against the configured InfluxDB, or without metrics
    /// when none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error when a worker session cannot be created.
    pub async fn run(&mut self) -> AppResult<LoadTestReport> {
        let candidate: Arc<dyn MetricSink> = match &self.config.sink {
            Some(influx) => match InfluxSink::new(influx.clone()) {
                Ok(sink) => Arc::new(sink),
                Err(err) => {
                    warn!("Metrics disabled: {}", err);
                    Arc::new(NoopSink)
                }
            },
            None => Arc::new(NoopSink),
        };
        self.run_with_sink(candidate).await
    }

    /// Runs the test, recording to `candidate` when it can be provisioned.
    ///
    /// # Errors
    ///
    /// Returns an error when a worker session cannot be created. No request
    /// is sent in that case.
    pub async fn run_with_sink(
        &mut self,
        candidate: Arc<dyn MetricSink>,
    ) -> AppResult<LoadTestReport> {
        let sink = select_sink(candidate).await;
        let recording = sink.is_recording();

        let workers = (0..self.config.workers)
            .map(|id| {
                Worker::new(
                    id,
                    Arc::clone(&self.config),
                    Arc::clone(&self.entries),
                    Arc::clone(&sink),
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::http)?;

        let (shutdown_tx, _) = shutdown_channel();
        let mut external_rx = self.external.as_ref().map(ShutdownSender::subscribe);

        info!(
            "Starting {} workers for {:?} over {} entries",
            workers.len(),
            self.config.duration,
            self.entries.entries().len()
        );
        let started = Instant::now();
        self.state = RunState::Running;

        let handles: Vec<JoinHandle<WorkerSummary>> = workers
            .into_iter()
            .map(|worker| tokio::spawn(worker.run(shutdown_tx.subscribe())))
            .collect();
        let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();

        let all_done = join_all(handles);
        tokio::pin!(all_done);

        let external_signal = async {
            match external_rx.as_mut() {
                Some(rx) => drop(rx.recv().await),
                None => std::future::pending::<()>().await,
            }
        };

        let (outcome, results) = tokio::select! {
            results = &mut all_done => (RunOutcome::Completed, Some(results)),
            () = sleep(self.config.duration) => {
                info!(
                    "Timeout of {:.1}s elapsed. Terminating load test.",
                    self.config.duration.as_secs_f64()
                );
                (RunOutcome::TimedOut, None)
            }
            () = external_signal => {
                info!("Shutdown requested. Terminating load test.");
                (RunOutcome::Interrupted, None)
            }
        };

        let results = match results {
            Some(results) => results,
            None => {
                drop(shutdown_tx.send(()));
                match timeout(SHUTDOWN_GRACE, &mut all_done).await {
                    Ok(results) => results,
                    Err(_elapsed) => {
                        warn!(
                            "Workers did not stop within {:?}; aborting them",
                            SHUTDOWN_GRACE
                        );
                        for handle in &aborts {
                            handle.abort();
                        }
                        all_done.await
                    }
                }
            }
        };

        let mut summaries = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(err) if err.is_cancelled() => debug!("Worker aborted after grace period"),
                Err(err) => warn!("Worker task failed: {}", err),
            }
        }

        self.state = outcome.into();
        let elapsed = started.elapsed();
        if outcome == RunOutcome::Completed {
            info!("All workers finished.");
        }
        Ok(LoadTestReport {
            outcome,
            workers: summaries,
            elapsed,
            recording,
        })
    }
}
