use std::path::PathBuf;

use clap::Args;
use stegavid_core::EngineConfig;

use crate::cli::{progress_printer, MethodArgs, PasswordArgs};
use crate::CliResult;

/// Hides a file or a message in video frames, audio tracks or behind a file
#[derive(Args, Debug)]
pub struct HideArgs {
    #[command(flatten)]
    pub password: PasswordArgs,

    /// Frame directory, video, WAV audio or any file for appending, used readonly.
    #[arg(short = 'i', long = "in", value_name = "media file", required = true)]
    pub media: PathBuf,

    /// The carrier with the hidden data will be stored here
    #[arg(
        short = 'o',
        long = "out",
        value_name = "output file",
        required = true
    )]
    pub write_to_file: PathBuf,

    /// File to hide (file and append methods)
    #[arg(
        short = 'd',
        long = "data",
        value_name = "data file",
        required_unless_present = "message"
    )]
    pub data_file: Option<PathBuf>,

    /// A text message that will be hidden
    #[arg(
        short,
        long,
        value_name = "text message",
        required_unless_present = "data_file"
    )]
    pub message: Option<String>,

    #[command(flatten)]
    pub method: MethodArgs,
}

impl HideArgs {
    pub fn run(self, config: EngineConfig, quiet: bool) -> CliResult<()> {
        let options = self.method.codec_options();
        let outcome = stegavid_core::commands::hide(
            &self.media,
            &self.write_to_file,
            self.data_file,
            self.message,
            self.password.resolve(true),
            options,
            config,
            progress_printer(quiet),
        )?;

        for warning in &outcome.warnings {
            eprintln!("Warning: {warning}");
        }
        println!("{}", outcome.message);

        Ok(())
    }
}
