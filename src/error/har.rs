use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarError {
    #[error("Failed to open HAR file '{path}': {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode HAR: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
    #[error("Entry {index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },
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
