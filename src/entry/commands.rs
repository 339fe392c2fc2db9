use std::sync::Arc;

use clap::ArgMatches;
use tracing::info;

use harload::args::{LoadArgs, ValidateArgs};
use harload::config::{apply_config, build_run_config, load_config};
use harload::error::{AppError, AppResult};
use harload::har::load_har_file;
use harload::http::validate_entries;
use harload::loadtest::Coordinator;
use harload::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

use crate::system::summary_output::summary_lines;

pub(super) fn run_validate(args: &ValidateArgs) -> AppResult<()> {
    let har = load_har_file(&args.har_file)?;
    let checked =
        validate_entries(&har.log.entries, args.ignore_har_cookies).map_err(AppError::har)?;
    println!("{}: {} entries OK", args.har_file.display(), checked);
    Ok(())
}

pub(super) async fn run_load(mut args: LoadArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    let run_config = build_run_config(&args)?;
    let har = load_har_file(&args.har_file)?;
    info!(
        "Loaded {} entries from {}",
        har.log.entries.len(),
        args.har_file.display()
    );

    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let mut coordinator =
        Coordinator::new(run_config, Arc::new(har)).with_shutdown(shutdown_tx.clone());
    let result = coordinator.run().await;

    drop(shutdown_tx.send(()));
    signal_handle.abort();

    let report = result?;
    for line in summary_lines(&report) {
        println!("{}", line);
    }
    Ok(())
}
