use std::fmt::{self, Debug, Formatter};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{error, info};
use tempfile::NamedTempFile;

use crate::config::EngineConfig;
use crate::error::StegError;
use crate::media::audio::DctCodec;
use crate::media::container;
use crate::media::payload::{open_text, EnvelopeFormat, EnvelopeParser, Metadata, Payload};
use crate::media::video::LsbFrameCodec;
use crate::media::{ChannelSelection, CodecOptions};
use crate::progress::{Interrupt, ProgressSink, ProgressTracker};

use super::shared::{ensure_carrier_exists, load_audio, open_frames};
use super::Password;

pub fn prepare<'a>() -> UnveilApi<'a> {
    UnveilApi::default()
}

/// The recovered secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovered {
    /// text methods hand the message back directly
    Text(String),
    /// file methods write the file into the output folder
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnveilOutcome {
    pub message: String,
    pub recovered: Recovered,
    pub metadata: Option<Metadata>,
}

#[derive(Default)]
pub struct UnveilApi<'a> {
    secret_media: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    password: Password,
    options: CodecOptions,
    config: EngineConfig,
    progress: Option<Box<dyn ProgressSink + 'a>>,
    interrupt: Option<Box<dyn Interrupt + 'a>>,
}

impl Debug for UnveilApi<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnveilApi")
            .field("secret_media", &self.secret_media)
            .field("output_folder", &self.output_folder)
            .field("password", &self.password)
            .field("options", &self.options)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> UnveilApi<'a> {
    /// Use the given codec options, they have to match the ones used for hiding
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// This is the carrier that contains the data to be unveiled
    pub fn from_secret_file(mut self, secret_media: impl AsRef<Path>) -> Self {
        self.secret_media = Some(secret_media.as_ref().to_path_buf());
        self
    }

    /// This is the folder where recovered files will be saved to,
    /// only needed by the methods that hide files
    pub fn into_output_folder(mut self, output_folder: impl AsRef<Path>) -> Self {
        self.output_folder = Some(output_folder.as_ref().to_path_buf());
        self
    }

    /// Set the password used for decrypting the text
    /// If `None` is passed, no password will be used
    pub fn using_password<P: Into<Password>>(mut self, password: P) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_progress<P: ProgressSink + 'a>(mut self, progress: P) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn with_interrupt<I: Interrupt + 'a>(mut self, interrupt: I) -> Self {
        self.interrupt = Some(Box::new(interrupt));
        self
    }

    /// Execute the unveil process and blocks until it is finished
    pub fn execute(mut self) -> Result<UnveilOutcome, StegError> {
        let Some(secret_media) = self.secret_media.take() else {
            return Err(StegError::CarrierNotSet);
        };
        ensure_carrier_exists(&secret_media)?;
        if self.options.carries_file() && self.output_folder.is_none() {
            return Err(StegError::TargetNotSet);
        }
        if self.password.is_set() && !self.options.is_encrypted() {
            return Err(StegError::PasswordNotSupported);
        }
        let mut tracker = ProgressTracker::new(self.progress.take(), self.interrupt.take());

        let outcome = match &self.options {
            CodecOptions::FrameLsb(_) => {
                let mut source = open_frames(&secret_media, &self.config)?;
                let payload = LsbFrameCodec::new(ChannelSelection::All).extract(
                    &mut source,
                    self.parser(EnvelopeFormat::FileInFrames),
                    &mut tracker,
                )?;
                self.write_recovered_file(payload)?
            }
            CodecOptions::TextLsb(options) => {
                let Some(password) = self.password.as_deref() else {
                    return Err(StegError::MissingPassword);
                };
                options.validate()?;
                let mut source = open_frames(&secret_media, &self.config)?;
                let token = LsbFrameCodec::new(ChannelSelection::Single(options.channel))
                    .extract(
                        &mut source,
                        self.parser(EnvelopeFormat::EncryptedText),
                        &mut tracker,
                    )?;
                text_outcome(open_text(&token, password)?)
            }
            CodecOptions::AudioDct(options) => {
                let codec = DctCodec::new(options)?;
                let scratch = self.config.scratch_dir()?;
                let audio = load_audio(&secret_media, &self.config, &scratch)?;
                let payload = codec.extract(
                    &audio.channel(0),
                    self.parser(EnvelopeFormat::TerminatedText),
                    &mut tracker,
                )?;
                text_outcome(String::from_utf8(payload.data)?)
            }
            CodecOptions::ContainerAppend => {
                tracker.checkpoint()?;
                let payload = container::extract(&secret_media)?;
                self.write_recovered_file(payload)?
            }
        };
        tracker.finish();
        info!("{}", outcome.message);

        Ok(outcome)
    }

    fn parser(&self, format: EnvelopeFormat) -> EnvelopeParser {
        format
            .parser()
            .with_search_window(self.config.search_window)
    }

    /// writes the file under its stored name, never overwriting an existing one
    fn write_recovered_file(&self, payload: Payload) -> Result<UnveilOutcome, StegError> {
        let Some(folder) = self.output_folder.as_ref() else {
            return Err(StegError::TargetNotSet);
        };
        let Some(metadata) = payload.metadata else {
            return Err(StegError::CorruptMetadata(
                "the hidden file has no metadata".to_string(),
            ));
        };
        fs::create_dir_all(folder).map_err(|source| StegError::WriteError { source })?;
        let target = metadata.unique_target(folder)?;
        write_new_file(folder, &target, &payload.data).inspect_err(|e| {
            error!("Error writing recovered file {target:?}: {e}");
        })?;

        Ok(UnveilOutcome {
            message: format!(
                "Recovered {:?} ({} bytes) into {target:?}",
                metadata.filename,
                payload.data.len()
            ),
            recovered: Recovered::File(target),
            metadata: Some(metadata),
        })
    }
}

/// writes through a temp file in `folder`, `target` appears complete or not at all
fn write_new_file(folder: &Path, target: &Path, data: &[u8]) -> Result<(), StegError> {
    let mut file =
        NamedTempFile::new_in(folder).map_err(|source| StegError::WriteError { source })?;
    file.write_all(data)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|source| StegError::WriteError { source })?;
    file.persist_noclobber(target)
        .map_err(|e| StegError::WriteError { source: e.error })?;

    Ok(())
}

fn text_outcome(text: String) -> UnveilOutcome {
    UnveilOutcome {
        message: format!("Recovered a text of {} characters", text.chars().count()),
        recovered: Recovered::Text(text),
        metadata: None,
    }
}
