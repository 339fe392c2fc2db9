//! Metric sinks: where measurement batches go.
//!
//! A sink is chosen once, before any worker starts. When the configured store
//! cannot be provisioned the run falls back to [`NoopSink`] and keeps
//! replaying without recording.
pub mod influx;
mod noop;
mod port;
mod select;


pub use influx::{InfluxConfig, InfluxSink};
pub use noop::NoopSink;
pub use port::{FlushReport, MetricSink};
pub use select::select_sink;
