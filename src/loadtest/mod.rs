//! Replay engine: workers that loop over the capture and the coordinator that
//! bounds the run.
mod config;
mod coordinator;
mod worker;


pub use config::RunConfig;
pub use coordinator::{Coordinator, LoadTestReport, RunOutcome, RunState, SHUTDOWN_GRACE};
pub use worker::{Worker, WorkerStop, WorkerSummary};
