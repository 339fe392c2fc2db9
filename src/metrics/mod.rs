//! Per-request measurements, batching, and tag extraction.
mod batch;
mod measurement;
mod tags;


pub use batch::{FLUSH_THRESHOLD, MeasurementBatch};
pub use measurement::{Measurement, RequestTiming, Stopwatch, TRANSPORT_FAILURE_STATUS};
pub use tags::{TagSpec, Tags, extract_tags};
