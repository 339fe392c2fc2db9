//! InfluxDB 1.x HTTP API sink.
mod client;
mod config;
mod line;

pub use client::InfluxSink;
pub use config::{Credentials, DEFAULT_INFLUX_URL, InfluxConfig};

#[cfg(test)]
pub(crate) use line::{MEASUREMENT_NAME, encode_point};
