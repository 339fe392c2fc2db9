use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::SinkError;
use crate::metrics::Measurement;
use crate::sinks::port::{FlushReport, MetricSink};

use super::config::InfluxConfig;
use super::line::encode_point;

const SINK_NAME: &str = "InfluxDB";
/// Bound on a single query or write call.
const INFLUX_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StatementResult {
    #[serde(default)]
    error: Option<String>,
}

/// Writes measurement batches to an InfluxDB 1.x server.
///
/// One instance is shared by all workers; writes go out one at a time.
#[derive(Debug)]
pub struct InfluxSink {
    client: Client,
    config: InfluxConfig,
    write_lock: Mutex<()>,
}

impl InfluxSink {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: InfluxConfig) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(INFLUX_REQUEST_TIMEOUT)
            .build()
            .map_err(|err| SinkError::BuildClient {
                sink: SINK_NAME,
                source: err,
            })?;
        Ok(Self {
            client,
            config,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &InfluxConfig {
        &self.config
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.credentials.as_ref() {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => builder,
        }
    }

    async fn query(&self, command: &str) -> Result<(), SinkError> {
        debug!("Query: {}", command);
        let request = self
            .client
            .post(self.config.endpoint("query"))
            .query(&[("q", command)]);
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(unreachable_error)?;
        let status = response.status();
        let body = response.text().await.map_err(unreachable_error)?;
        if !status.is_success() {
            return Err(SinkError::Rejected {
                sink: SINK_NAME,
                operation: "query",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse = serde_json::from_str(&body).unwrap_or_default();
        let statement_error = parsed
            .error
            .or_else(|| parsed.results.into_iter().find_map(|result| result.error));
        if let Some(message) = statement_error {
            return Err(SinkError::Query {
                sink: SINK_NAME,
                message,
            });
        }
        Ok(())
    }

    fn encode_batch(batch: &[Measurement]) -> (String, FlushReport) {
        let mut body = String::new();
        let mut report = FlushReport::default();
        for measurement in batch {
            match encode_point(measurement, Utc::now()) {
                Ok(line) => {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(&line);
                    report.written = report.written.saturating_add(1);
                }
                Err(err) => {
                    warn!("Skipping point for {}: {}", measurement.url, err);
                    report.skipped = report.skipped.saturating_add(1);
                }
            }
        }
        (body, report)
    }
}

fn unreachable_error(source: reqwest::Error) -> SinkError {
    SinkError::Unreachable {
        sink: SINK_NAME,
        source,
    }
}

#[async_trait]
impl MetricSink for InfluxSink {
    fn name(&self) -> &'static str {
        SINK_NAME
    }

    async fn provision(&self) -> Result<(), SinkError> {
        info!("Connecting to InfluxDB: {}", self.config.addr);
        info!("DB: {}", self.config.database);
        let escaped = self.config.database.replace('"', "\\\"");
        self.query(&format!("CREATE DATABASE \"{}\"", escaped)).await
    }

    async fn flush(&self, batch: Vec<Measurement>) -> Result<FlushReport, SinkError> {
        let (body, report) = Self::encode_batch(&batch);
        if report.written == 0 {
            return Ok(report);
        }

        let request = self
            .client
            .post(self.config.endpoint("write"))
            .query(&[
                ("db", self.config.database.as_str()),
                ("precision", "u"),
            ])
            .body(body);

        let _guard = self.write_lock.lock().await;
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(unreachable_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                sink: SINK_NAME,
                operation: "write",
                status: status.as_u16(),
                body,
            });
        }
        debug!("Wrote {} points to InfluxDB", report.written);
        Ok(report)
    }
}
