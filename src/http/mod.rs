//! Request building and per-worker HTTP sessions.
mod builder;
mod session;

#[cfg(test)]
mod tests;

pub use builder::{build_request, validate_entries};
pub use session::{
    DIAL_TIMEOUT, KEEP_ALIVE_INTERVAL, MAX_REDIRECTS, RESPONSE_HEADER_TIMEOUT,
    SessionTimeouts, TLS_HANDSHAKE_TIMEOUT, WorkerSession,
};
