use std::time::Duration;

use clap::Parser;

use super::*;
use crate::error::AppError;

fn parse_load(args: &[&str]) -> Result<LoadArgs, String> {
    let cli = Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    match cli.command {
        Command::Load(load) => Ok(load),
        Command::Validate(_) => Err("expected load command".to_owned()),
    }
}

#[test]
fn load_defaults() -> Result<(), String> {
    let load = parse_load(&["harload", "load", "capture.har"])?;
    if load.workers.get() != 10 {
        return Err(format!("unexpected workers {}", load.workers.get()));
    }
    if load.duration != Duration::from_secs(60) {
        return Err(format!("unexpected duration {:?}", load.duration));
    }
    if load.influx_url != "http://localhost:8086/hargo" {
        return Err(format!("unexpected influx url {}", load.influx_url));
    }
    if load.ignore_har_cookies || load.no_metrics || !load.tags.is_empty() {
        return Err("flags should default to off".to_owned());
    }
    Ok(())
}

#[test]
fn load_flags_and_repeated_tags() -> Result<(), String> {
    let load = parse_load(&[
        "harload",
        "load",
        "capture.har",
        "-w",
        "3",
        "-d",
        "2m",
        "--ignore-har-cookies",
        "-t",
        "team,env",
        "--tag",
        "region",
    ])?;
    if load.workers.get() != 3 || load.duration != Duration::from_secs(120) {
        return Err("unexpected workers or duration".to_owned());
    }
    if !load.ignore_har_cookies {
        return Err("expected ignore-har-cookies".to_owned());
    }
    if load.tags != vec!["team,env".to_owned(), "region".to_owned()] {
        return Err(format!("unexpected tags {:?}", load.tags));
    }
    Ok(())
}

#[test]
fn rejects_zero_workers_and_bad_durations() -> Result<(), String> {
    for args in [
        ["harload", "load", "capture.har", "-w", "0"],
        ["harload", "load", "capture.har", "-d", "0s"],
        ["harload", "load", "capture.har", "-d", "10x"],
    ] {
        if Cli::try_parse_from(args).is_ok() {
            return Err(format!("expected parse failure for {:?}", args));
        }
    }
    Ok(())
}

#[test]
fn verbose_is_global() -> Result<(), String> {
    let cli = Cli::try_parse_from(["harload", "validate", "capture.har", "-v"])
        .map_err(|err| err.to_string())?;
    if !cli.verbose {
        return Err("expected verbose".to_owned());
    }
    if !matches!(cli.command, Command::Validate(_)) {
        return Err("expected validate command".to_owned());
    }
    Ok(())
}

#[test]
fn parse_duration_units() -> Result<(), AppError> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("15", Duration::from_secs(15)),
        ("15s", Duration::from_secs(15)),
        ("3m", Duration::from_secs(180)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (raw, expected) in cases {
        let parsed = parse_duration(raw)?;
        if parsed != expected {
            return Err(AppError::validation(format!("{} parsed as {:?}", raw, parsed)));
        }
    }
    for raw in ["", "ms", "0", "5d", "99999999999999999999h"] {
        if parse_duration(raw).is_ok() {
            return Err(AppError::validation(format!("{} should fail", raw)));
        }
    }
    Ok(())
}
