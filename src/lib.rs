//! Core library for the `harload` CLI.
//!
//! Replays the requests of an HTTP Archive (HAR) capture with a pool of
//! concurrent workers, each keeping its own cookie-aware session, and records
//! one measurement per request to InfluxDB. The primary user-facing
//! interface is the `harload` command-line application; library APIs may
//! evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod error;
pub mod har;
pub mod http;
pub mod loadtest;
pub mod metrics;
pub mod shutdown;
pub mod sinks;
