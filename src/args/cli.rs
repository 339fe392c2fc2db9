use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::sinks::influx::DEFAULT_INFLUX_URL;

use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::PositiveUsize;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Replays HTTP Archive (HAR) captures as concurrent load and records every request to InfluxDB."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (per-request lines)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Replay a HAR capture with concurrent workers
    Load(LoadArgs),
    /// Check that a HAR capture decodes and every entry builds a request
    Validate(ValidateArgs),
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// HAR capture to replay
    #[arg(value_name = "HARFILE")]
    pub har_file: PathBuf,

    /// Number of concurrent workers
    #[arg(
        long = "workers",
        short = 'w',
        default_value = "10",
        value_parser = parse_positive_usize
    )]
    pub workers: PositiveUsize,

    /// Maximum run time (supports ms/s/m/h)
    #[arg(
        long = "duration",
        short = 'd',
        default_value = "60s",
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// InfluxDB URL; the path names the database
    #[arg(long = "influx-url", default_value = DEFAULT_INFLUX_URL)]
    pub influx_url: String,

    /// InfluxDB user
    #[arg(long = "influx-user", env = "HARLOAD_INFLUX_USER")]
    pub influx_user: Option<String>,

    /// InfluxDB password
    #[arg(
        long = "influx-password",
        env = "HARLOAD_INFLUX_PASSWORD",
        hide_env_values = true
    )]
    pub influx_password: Option<String>,

    /// Run without recording metrics
    #[arg(long = "no-metrics")]
    pub no_metrics: bool,

    /// Do not send the cookies recorded in the capture
    #[arg(long = "ignore-har-cookies")]
    pub ignore_har_cookies: bool,

    /// Header or query parameter to record as a tag (repeatable, comma separated)
    #[arg(long = "tag", short = 't', action = ArgAction::Append)]
    pub tags: Vec<String>,

    /// Path to a config file (.toml or .json)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ValidateArgs {
    /// HAR capture to check
    #[arg(value_name = "HARFILE")]
    pub har_file: PathBuf,

    /// Build requests without the recorded cookies
    #[arg(long = "ignore-har-cookies")]
    pub ignore_har_cookies: bool,
}
