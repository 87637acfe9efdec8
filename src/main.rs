mod cli;
mod commands;
mod config;
mod logging;
mod model;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;
use std::env;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = config::Config::load()?;
    let command = args.command.unwrap_or(cli::Command::Tui);
    let location = match &command {
        cli::Command::Init { seed } => {
            let location = storage::init_location(&env::current_dir()?);
            storage::init_board(&location, *seed)?;
            location
        }
        _ => storage::locate_board(&env::current_dir()?)?,
    };
    let _logger = logging::init(&config.log_level, &location.dir)
        .map_err(|err| eprintln!("warning: logging disabled: {:#}", err))
        .ok();
    let session = commands::Session::open(location, &config);
    match command {
        cli::Command::Init { .. } => commands::init(&session),
        cli::Command::List { column, filter } => commands::list(session, column, filter),
        cli::Command::Column(command) => commands::column(session, command),
        cli::Command::Task(command) => commands::task(session, command),
        cli::Command::Bulk(command) => commands::bulk(session, command),
        cli::Command::Tui => commands::tui(session),
    }
}
