use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult, HarError};

use super::types::Har;

/// Decodes a HAR document from `reader`.
///
/// # Errors
///
/// Returns `HarError::Decode` when the input is not a valid HAR document.
pub fn decode<R: Read>(reader: R) -> Result<Har, HarError> {
    serde_json::from_reader(reader).map_err(|err| HarError::Decode { source: err })
}

/// Opens and decodes the HAR file at `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or decoded.
pub fn load_har_file(path: &Path) -> AppResult<Har> {
    let file = File::open(path).map_err(|err| {
        AppError::har(HarError::OpenFile {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    let har = decode(BufReader::new(file))?;
    debug!(
        "Decoded {} entries from {} (HAR {})",
        har.log.entries.len(),
        path.display(),
        har.log.version
    );
    Ok(har)
}
