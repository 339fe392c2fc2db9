use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::SinkError;
use crate::metrics::Measurement;

pub(crate) const MEASUREMENT_NAME: &str = "test_result";

/// Encodes one measurement as a line-protocol point with a microsecond
/// timestamp.
///
/// Tag keys and values must be non-empty; no key or string value may contain
/// a line break.
pub(crate) fn encode_point(
    measurement: &Measurement,
    timestamp: DateTime<Utc>,
) -> Result<String, SinkError> {
    validate(measurement)?;

    let mut line = String::with_capacity(256);
    escape_into(&mut line, MEASUREMENT_NAME, &[',', ' ']);
    for (key, value) in &measurement.tags {
        line.push(',');
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, value, &[',', '=', ' ']);
    }
    line.push(' ');

    string_field(&mut line, "URL", &measurement.url, false);
    integer_field(&mut line, "Status", u64::from(measurement.status));
    string_field(
        &mut line,
        "StartTime",
        &measurement
            .start_time
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        true,
    );
    string_field(
        &mut line,
        "EndTime",
        &measurement
            .end_time
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        true,
    );
    integer_field(&mut line, "Latency", measurement.latency_ms);
    string_field(&mut line, "Method", &measurement.method, true);
    string_field(&mut line, "HarFile", &measurement.har_file, true);

    line.push(' ');
    line.push_str(&timestamp.timestamp_micros().to_string());
    Ok(line)
}

fn validate(measurement: &Measurement) -> Result<(), SinkError> {
    for (key, value) in &measurement.tags {
        if key.is_empty() {
            return Err(invalid("empty tag key"));
        }
        if value.is_empty() {
            return Err(invalid(format!("empty value for tag '{}'", key)));
        }
        if has_line_break(key) || has_line_break(value) {
            return Err(invalid(format!("line break in tag '{}'", key.trim())));
        }
    }
    for (name, value) in [
        ("URL", measurement.url.as_str()),
        ("Method", measurement.method.as_str()),
        ("HarFile", &*measurement.har_file),
    ] {
        if has_line_break(value) {
            return Err(invalid(format!("line break in field '{}'", name)));
        }
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> SinkError {
    SinkError::InvalidPoint {
        reason: reason.into(),
    }
}

fn has_line_break(value: &str) -> bool {
    value.contains(['\n', '\r'])
}

fn escape_into(out: &mut String, value: &str, special: &[char]) {
    for ch in value.chars() {
        if special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}

fn string_field(out: &mut String, key: &str, value: &str, leading_comma: bool) {
    if leading_comma {
        out.push(',');
    }
    out.push_str(key);
    out.push_str("=\"");
    escape_into(out, value, &['"', '\\']);
    out.push('"');
}

fn integer_field(out: &mut String, key: &str, value: u64) {
    out.push(',');
    out.push_str(key);
    out.push('=');
    out.push_str(&value.to_string());
    out.push('i');
}
