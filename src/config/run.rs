use std::sync::Arc;

use tracing::info;

use crate::args::LoadArgs;
use crate::error::{AppError, AppResult};
use crate::loadtest::RunConfig;
use crate::metrics::TagSpec;
use crate::sinks::InfluxConfig;

/// Validates `args` into the immutable settings of one run.
///
/// # Errors
///
/// Returns an error for blank tag names or an unusable InfluxDB URL.
pub fn build_run_config(args: &LoadArgs) -> AppResult<RunConfig> {
    let tags = TagSpec::new(&args.tags).map_err(AppError::validation)?;
    let sink = if args.no_metrics {
        info!("Metrics disabled by --no-metrics");
        None
    } else {
        Some(
            InfluxConfig::from_url(
                &args.influx_url,
                args.influx_user.as_deref(),
                args.influx_password.as_deref(),
            )
            .map_err(AppError::config)?,
        )
    };

    Ok(RunConfig {
        workers: args.workers.get(),
        duration: args.duration,
        ignore_har_cookies: args.ignore_har_cookies,
        tags,
        har_file: Arc::from(args.har_file.display().to_string()),
        sink,
    })
}
