use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration;
use crate::error::{ConfigError, ValidationError};

/// Settings read from `harload.toml` or `harload.json`. Every field is
/// optional; explicit CLI flags win.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub workers: Option<usize>,
    pub duration: Option<DurationValue>,
    pub influx_url: Option<String>,
    pub influx_user: Option<String>,
    pub influx_password: Option<String>,
    pub no_metrics: Option<bool>,
    pub ignore_har_cookies: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Either whole seconds or a string with a unit (`"90s"`, `"2m"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Seconds(0) => Err(ConfigError::InvalidDuration {
                source: ValidationError::DurationZero,
            }),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => {
                parse_duration(text).map_err(|err| ConfigError::InvalidDuration { source: err })
            }
        }
    }
}
