use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to reach {sink}: {source}")]
    Unreachable {
        sink: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{sink} rejected {operation} with status {status}: {body}")]
    Rejected {
        sink: &'static str,
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("{sink} query failed: {message}")]
    Query {
        sink: &'static str,
        message: String,
    },
    #[error("Invalid point: {reason}")]
    InvalidPoint { reason: String },
    #[error("Failed to build {sink} client: {source}")]
    BuildClient {
        sink: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
