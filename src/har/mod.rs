//! HTTP Archive (HAR) model and decoding.
//!
//! Only the subset of HAR 1.2 needed to replay requests is modelled. The
//! decoded archive is immutable and is shared read-only by every worker.
mod decode;
mod types;


pub use decode::{decode, load_har_file};
pub use types::{Entry, Har, HarCookie, Log, NameValue, PostData, PostParam, RequestDescriptor};

/// Ordered, finite, re-readable sequence of request descriptors.
///
/// Implementations must be safe to walk concurrently from the start by any
/// number of workers.
pub trait EntrySource: Send + Sync {
    fn entries(&self) -> &[Entry];
}

impl EntrySource for Har {
    fn entries(&self) -> &[Entry] {
        &self.log.entries
    }
}

impl EntrySource for Vec<Entry> {
    fn entries(&self) -> &[Entry] {
        self.as_slice()
    }
}
