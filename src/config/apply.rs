use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{LoadArgs, PositiveUsize};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies config file values to `args` wherever the flag was not given on
/// the command line or through its environment variable.
///
/// `matches` are the matches of the `load` subcommand.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(args: &mut LoadArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_explicit(matches, "workers")
        && let Some(workers) = config.workers
    {
        args.workers = PositiveUsize::try_from(workers).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "workers".to_owned(),
                source: err,
            })
        })?;
    }

    if !is_explicit(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = duration.to_duration().map_err(AppError::config)?;
    }

    if !is_explicit(matches, "influx_url")
        && let Some(url) = config.influx_url.as_ref()
    {
        args.influx_url.clone_from(url);
    }

    if !is_explicit(matches, "influx_user")
        && let Some(user) = config.influx_user.as_ref()
    {
        args.influx_user = Some(user.clone());
    }

    if !is_explicit(matches, "influx_password")
        && let Some(password) = config.influx_password.as_ref()
    {
        args.influx_password = Some(password.clone());
    }

    if !is_explicit(matches, "no_metrics")
        && let Some(no_metrics) = config.no_metrics
    {
        args.no_metrics = no_metrics;
    }

    if !is_explicit(matches, "ignore_har_cookies")
        && let Some(ignore) = config.ignore_har_cookies
    {
        args.ignore_har_cookies = ignore;
    }

    if !is_explicit(matches, "tags")
        && let Some(tags) = config.tags.as_ref()
    {
        args.tags.clone_from(tags);
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}
