use std::path::PathBuf;

use clap::Args;
use stegavid_core::{EngineConfig, Recovered};

use crate::cli::{progress_printer, MethodArgs, PasswordArgs};
use crate::CliResult;

/// Unveils a hidden file or message
#[derive(Args, Debug)]
pub struct UnveilArgs {
    #[command(flatten)]
    pub password: PasswordArgs,

    /// Carrier that contains secret data
    #[arg(
        short = 'i',
        long = "in",
        value_name = "media source file",
        required = true
    )]
    pub media: PathBuf,

    /// Recovered files will be stored in that folder
    #[arg(
        short = 'o',
        long = "out",
        value_name = "output folder",
        default_value = "."
    )]
    pub output_folder: PathBuf,

    #[command(flatten)]
    pub method: MethodArgs,
}

impl UnveilArgs {
    pub fn run(self, config: EngineConfig, quiet: bool) -> CliResult<()> {
        let options = self.method.codec_options();
        let outcome = stegavid_core::commands::unveil(
            &self.media,
            &self.output_folder,
            self.password.resolve(false),
            options,
            config,
            progress_printer(quiet),
        )?;

        match outcome.recovered {
            Recovered::Text(text) => println!("{text}"),
            Recovered::File(path) => println!("{}", path.display()),
        }
        log::info!("{}", outcome.message);

        Ok(())
    }
}
