use std::process::ExitCode;

use clap::Parser;
use stegavid_core::StegError;

mod cli;
mod commands;

use cli::CliArgs;

pub type CliResult<T> = Result<T, StegError>;

fn main() -> ExitCode {
    env_logger::init();

    match CliArgs::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
