mod commands;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use harload::args::{Cli, Command};
use harload::error::AppResult;

use commands::{run_load, run_validate};

pub(crate) fn run() -> AppResult<()> {
    let (cli, matches) = parse_args()?;

    crate::system::logger::init_logging(cli.verbose, cli.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(cli, &matches))
}

fn parse_args() -> AppResult<(Cli, ArgMatches)> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    Ok((cli, matches))
}

async fn run_async(cli: Cli, matches: &ArgMatches) -> AppResult<()> {
    match cli.command {
        Command::Validate(args) => run_validate(&args),
        Command::Load(args) => {
            let load_matches = matches
                .subcommand_matches("load")
                .cloned()
                .unwrap_or_default();
            run_load(args, &load_matches).await
        }
    }
}
