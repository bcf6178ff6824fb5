use std::process::ExitCode;

use atomco::config::Config;
use atomco::utils::logger;
use log::LevelFilter;

mod cli;
mod commands;

fn main() -> ExitCode {
    let cli = cli::parse();
    let (config, config_msg) = Config::load();

    let level = if cli.verbosity.verbose {
        LevelFilter::Debug
    } else if cli.verbosity.quiet {
        LevelFilter::Error
    } else {
        logger::level_from_name(&config.log_level)
    };
    if logger::init(level).is_err() {
        eprintln!("logger already initialised");
    }
    log::debug!("{}", config_msg);

    match commands::dispatch(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
