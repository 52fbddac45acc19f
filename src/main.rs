mod agents;
mod cli;
mod config;
mod error;
mod package;
mod repository;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use config::Config;
use error::{Result, RudixError};
use log::debug;
use std::path::Path;
use std::process;
use workflow::{CommandStatus, Session};

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(&cli) {
        Ok(status) => process::exit(status.exit_code()),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            let code = match e {
                RudixError::PermissionDenied => 2,
                _ => 1,
            };
            process::exit(code);
        }
    }
}

fn init_logger(verbose: bool) {
    let filter = if verbose { "warn,rudix=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<CommandStatus> {
    let command = cli.command.clone().unwrap_or(Commands::List);

    if command.requires_administrator() {
        utils::privilege::require_administrator()?;
    }

    let config = Config::new(
        &cli.site,
        &cli.track,
        cli.platform.as_deref(),
        &cli.vendor,
        &cli.volume,
    )?
    .with_validated_volume()?;
    debug!("Using {:?}", config);

    let session = Session::new(config, cli.verbose)?;

    match command {
        Commands::List => workflow::execute_list(&session),
        Commands::Info { packages } => workflow::execute_info(&session, &packages),
        Commands::Files { packages } => workflow::execute_files(&session, &packages),
        Commands::Install { packages } => workflow::execute_install(&session, &packages),
        Commands::Download { packages } => {
            workflow::execute_download(&session, &packages, Path::new("."))
        }
        Commands::Update { dry_run, json } => workflow::execute_update(&session, dry_run, json),
        Commands::Remove { packages } => workflow::execute_remove(&session, &packages),
        Commands::RemoveAll { force } => workflow::execute_remove_all(&session, force),
        Commands::Status => workflow::execute_status(&session),
        Commands::Search { names } => workflow::execute_search(&session, &names),
        Commands::SearchPath { paths } => workflow::execute_search_path(&session, &paths),
        Commands::Alias { names } => workflow::execute_alias(&session, &names),
        Commands::Freeze => workflow::execute_freeze(&session),
    }
}
