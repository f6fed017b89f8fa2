use std::fs;
use std::path::PathBuf;

use clap::Args;
use stegavid_core::{EngineConfig, StegError};

use crate::cli::MethodArgs;
use crate::CliResult;

/// Shows how much data a carrier can take
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// Frame directory, video, WAV audio or any file for appending
    #[arg(short = 'i', long = "in", value_name = "media file", required = true)]
    pub media: PathBuf,

    /// Also show how much of the capacity this file would take
    #[arg(short = 'd', long = "data", value_name = "data file")]
    pub data: Option<PathBuf>,

    #[command(flatten)]
    pub method: MethodArgs,
}

impl CapacityArgs {
    pub fn run(self, config: EngineConfig) -> CliResult<()> {
        let report =
            stegavid_core::commands::capacity(&self.media, self.method.codec_options(), config)?;
        println!("{report}");

        if let Some(data) = self.data {
            let len = fs::metadata(&data)
                .map_err(|source| StegError::ReadError { source })?
                .len();
            let usage = report.usage(len);
            println!("{usage}");
            if !usage.fits() {
                println!("{data:?} does not fit into the carrier");
            }
        }

        Ok(())
    }
}
