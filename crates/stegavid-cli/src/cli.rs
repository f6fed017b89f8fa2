use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dialoguer::Password;
use stegavid_core::media::{DctCodecOptions, FrameLsbOptions, TextLsbOptions};
use stegavid_core::{CodecOptions, EngineConfig};

use crate::commands::*;
use crate::CliResult;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// The ffmpeg binary used to decode and encode videos
    #[arg(long, env = "STEGAVID_FFMPEG", default_value = "ffmpeg", global = true)]
    pub ffmpeg: PathBuf,

    /// The ffprobe binary used to inspect videos
    #[arg(long, env = "STEGAVID_FFPROBE", default_value = "ffprobe", global = true)]
    pub ffprobe: PathBuf,

    /// Directory for intermediate files, the system temp dir by default
    #[arg(long, value_name = "dir", global = true)]
    pub temp_dir: Option<PathBuf>,

    /// Do not print the progress
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    pub fn run(self) -> CliResult<()> {
        let mut config = EngineConfig::default()
            .with_ffmpeg(&self.ffmpeg)
            .with_ffprobe(&self.ffprobe);
        if let Some(temp_dir) = &self.temp_dir {
            config = config.with_temp_dir(temp_dir);
        }

        match self.command {
            Commands::Capacity(args) => args.run(config),
            Commands::Hide(args) => args.run(config, self.quiet),
            Commands::Unveil(args) => args.run(config, self.quiet),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Capacity(capacity::CapacityArgs),
    Hide(hide::HideArgs),
    Unveil(unveil::UnveilArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// a file in the pixels of video frames or a frame directory
    File,
    /// a password protected text in the blue channel of video frames
    Text,
    /// a text in the audio track of a WAV file or video
    Audio,
    /// a file appended behind the end of any file
    Append,
}

/// Hiding method and its tunables, unveiling has to use the same values
#[derive(Args, Debug)]
pub struct MethodArgs {
    /// How the data is hidden
    #[arg(long, value_enum, default_value_t = Method::File)]
    pub method: Method,

    /// Trailing frames not counted as capacity (file method)
    #[arg(long, default_value_t = 10)]
    pub reserved_frames: usize,

    /// Color channel carrying the text, 0 is blue (text method)
    #[arg(long, default_value_t = 0)]
    pub channel: usize,

    /// Samples per audio block, one bit each (audio method)
    #[arg(long, default_value_t = 128)]
    pub block_size: usize,

    /// Minimal distance between the two compared coefficients (audio method)
    #[arg(long, default_value_t = 400.0)]
    pub margin: f64,
}

impl MethodArgs {
    pub fn codec_options(&self) -> CodecOptions {
        match self.method {
            Method::File => CodecOptions::FrameLsb(
                FrameLsbOptions::default().with_reserved_frames(self.reserved_frames),
            ),
            Method::Text => {
                CodecOptions::TextLsb(TextLsbOptions::default().with_channel(self.channel))
            }
            Method::Audio => CodecOptions::AudioDct(
                DctCodecOptions::default()
                    .with_block_size(self.block_size)
                    .with_margin(self.margin),
            ),
            Method::Append => CodecOptions::ContainerAppend,
        }
    }
}

/// Password given on the command line, or asked for interactively
#[derive(Args, Debug)]
pub struct PasswordArgs {
    /// Password used to encrypt the text (text method only)
    #[arg(short, long, value_name = "password")]
    pub password: Option<String>,

    /// Ask for the password instead of passing it on the command line
    #[arg(long, conflicts_with = "password")]
    pub ask_password: bool,
}

impl PasswordArgs {
    pub fn resolve(self, confirm: bool) -> Option<String> {
        if self.ask_password {
            ask_for_password(confirm)
        } else {
            self.password
        }
    }
}

pub fn ask_for_password(confirm: bool) -> Option<String> {
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Error: the passwords don't match.");
    }

    match prompt.interact() {
        Ok(password) => Some(password),
        Err(e) => {
            log::error!("Could not read the password: {e}");
            None
        }
    }
}

/// prints the percentage on one stderr line
pub fn progress_printer(quiet: bool) -> impl FnMut(u8) {
    move |percent: u8| {
        if quiet {
            return;
        }
        eprint!("\r{percent:>3}%");
        if percent == 100 {
            eprintln!();
        }
    }
}
