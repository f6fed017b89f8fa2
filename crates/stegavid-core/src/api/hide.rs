use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};

use log::{info, warn};
use tempfile::NamedTempFile;

use crate::capacity::{audio_dct, ensure_fits, file_in_frames, text_in_frames};
use crate::config::EngineConfig;
use crate::cursor::EmbeddingCursor;
use crate::error::StegError;
use crate::media::audio::DctCodec;
use crate::media::container::{self, REENCODING_WARNING};
use crate::media::payload::{seal_text, EnvelopeFormat, Metadata, Payload};
use crate::media::video::{FrameSource, LsbFrameCodec};
use crate::media::{
    CarrierKind, ChannelSelection, CodecOptions, DctCodecOptions, FrameLsbOptions, Persist,
    TextLsbOptions,
};
use crate::progress::{Interrupt, ProgressSink, ProgressTracker};
use crate::transcoder::{is_lossy_audio_container, Transcoder};

use super::shared::{
    ensure_carrier_exists, load_audio, move_file, open_frames, parent_dir, FrameTarget,
};
use super::Password;

/// file name used when a plain message is hidden by a method that carries files
pub const MESSAGE_FILE_NAME: &str = "secret-message.txt";

pub fn prepare<'a>() -> HideApi<'a> {
    HideApi::default()
}

/// What a successful hide produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HideOutcome {
    pub message: String,
    /// the written carrier, may differ in extension from the requested output
    pub output: PathBuf,
    pub warnings: Vec<String>,
    /// set when a file was hidden
    pub metadata: Option<Metadata>,
}

#[derive(Default)]
pub struct HideApi<'a> {
    message: Option<String>,
    file: Option<PathBuf>,
    carrier: Option<PathBuf>,
    output: Option<PathBuf>,
    password: Password,
    options: CodecOptions,
    config: EngineConfig,
    progress: Option<Box<dyn ProgressSink + 'a>>,
    interrupt: Option<Box<dyn Interrupt + 'a>>,
}

impl Debug for HideApi<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HideApi")
            .field("message", &self.message.as_ref().map(|m| m.len()))
            .field("file", &self.file)
            .field("carrier", &self.carrier)
            .field("output", &self.output)
            .field("password", &self.password)
            .field("options", &self.options)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> HideApi<'a> {
    /// Selects the hiding method and its tunables
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn use_message<S: AsRef<str>>(mut self, message: Option<S>) -> Self {
        self.message = message.map(|s| s.as_ref().to_string());
        self
    }

    pub fn with_file<A: AsRef<Path>>(mut self, data_file: A) -> Self {
        self.file = Some(data_file.as_ref().to_path_buf());
        self
    }

    pub fn use_file(mut self, data_file: Option<PathBuf>) -> Self {
        self.file = data_file;
        self
    }

    pub fn with_carrier<A: AsRef<Path>>(mut self, carrier: A) -> Self {
        self.carrier = Some(carrier.as_ref().to_path_buf());
        self
    }

    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.into();
        self
    }

    /// Set the password
    /// If `None` is passed, no password will be used
    pub fn use_password<P: Into<Password>>(mut self, password: P) -> Self {
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

    /// Hides the payload and blocks until the output is written
    pub fn execute(mut self) -> Result<HideOutcome, StegError> {
        let Some(carrier) = self.carrier.take() else {
            return Err(StegError::CarrierNotSet);
        };
        let Some(output) = self.output.take() else {
            return Err(StegError::TargetNotSet);
        };
        ensure_carrier_exists(&carrier)?;
        let mut tracker = ProgressTracker::new(self.progress.take(), self.interrupt.take());

        let job = Job {
            carrier: &carrier,
            output: &output,
            config: &self.config,
        };
        let outcome = match &self.options {
            CodecOptions::FrameLsb(options) => {
                let mut warnings = Vec::new();
                let payload = self.file_payload(&mut warnings)?;
                job.file_in_frames(payload, options, warnings, &mut tracker)?
            }
            CodecOptions::TextLsb(options) => {
                let text = self.text_payload()?;
                let Some(password) = self.password.as_deref() else {
                    return Err(StegError::MissingPassword);
                };
                job.text_in_frames(&text, password, options, &mut tracker)?
            }
            CodecOptions::AudioDct(options) => {
                if self.password.is_set() {
                    return Err(StegError::PasswordNotSupported);
                }
                let text = self.text_payload()?;
                job.text_in_audio(&text, options, &mut tracker)?
            }
            CodecOptions::ContainerAppend => {
                let mut warnings = Vec::new();
                let payload = self.file_payload(&mut warnings)?;
                job.append(payload, warnings, &mut tracker)?
            }
        };
        tracker.finish();
        info!("{}", outcome.message);

        Ok(outcome)
    }

    /// the file to hide, a message is wrapped into a text file
    fn file_payload(&self, warnings: &mut Vec<String>) -> Result<Payload, StegError> {
        if self.password.is_set() {
            return Err(StegError::PasswordNotSupported);
        }
        match (&self.file, &self.message) {
            (Some(file), message) => {
                if message.is_some() {
                    warn!("Both a file and a message were given, only the file is hidden");
                    warnings.push("The message was ignored, only the file is hidden".to_string());
                }
                Payload::from_file(file)
            }
            (None, Some(message)) => {
                let data = message.as_bytes().to_vec();
                let metadata = Metadata::for_file(Path::new(MESSAGE_FILE_NAME), data.len() as u64)?;
                Ok(Payload::from_file_data(data, metadata))
            }
            (None, None) => Err(StegError::MissingFiles),
        }
    }

    fn text_payload(&self) -> Result<String, StegError> {
        let Some(message) = self.message.as_ref() else {
            return Err(StegError::MissingMessage);
        };
        if self.file.is_some() {
            warn!("Text methods hide no files, the file is ignored");
        }

        Ok(message.clone())
    }
}

struct Job<'p> {
    carrier: &'p Path,
    output: &'p Path,
    config: &'p EngineConfig,
}

impl Job<'_> {
    fn file_in_frames(
        &self,
        payload: Payload,
        options: &FrameLsbOptions,
        mut warnings: Vec<String>,
        tracker: &mut ProgressTracker,
    ) -> Result<HideOutcome, StegError> {
        let mut source = open_frames(self.carrier, self.config)?;
        let geometry = source.geometry().clone();
        ensure_fits(payload.len() as u64, file_in_frames(&geometry, options))?;

        let envelope = EnvelopeFormat::FileInFrames.encode(&payload)?;
        let (output, mut more) =
            self.embed_frames(&mut source, envelope, ChannelSelection::All, tracker)?;
        warnings.append(&mut more);

        Ok(HideOutcome {
            message: format!(
                "Hidden {} bytes of {:?} in {} frames of {output:?}",
                payload.len(),
                payload.metadata.as_ref().map(|m| m.filename.as_str()).unwrap_or_default(),
                geometry.frame_count,
            ),
            output,
            warnings,
            metadata: payload.metadata,
        })
    }

    fn text_in_frames(
        &self,
        text: &str,
        password: &str,
        options: &TextLsbOptions,
        tracker: &mut ProgressTracker,
    ) -> Result<HideOutcome, StegError> {
        options.validate()?;
        let mut source = open_frames(self.carrier, self.config)?;
        let geometry = source.geometry().clone();
        ensure_fits(text.len() as u64, text_in_frames(&geometry, options))?;

        let sealed = seal_text(text, password);
        let envelope = EnvelopeFormat::EncryptedText.encode(&sealed)?;
        let (output, warnings) = self.embed_frames(
            &mut source,
            envelope,
            ChannelSelection::Single(options.channel),
            tracker,
        )?;

        Ok(HideOutcome {
            message: format!(
                "Hidden an encrypted text of {} characters in {output:?}",
                text.chars().count()
            ),
            output,
            warnings,
            metadata: None,
        })
    }

    fn embed_frames<S: FrameSource>(
        &self,
        source: &mut S,
        envelope: Vec<u8>,
        selection: ChannelSelection,
        tracker: &mut ProgressTracker,
    ) -> Result<(PathBuf, Vec<String>), StegError> {
        let geometry = source.geometry().clone();
        let (target, mut sink) =
            FrameTarget::prepare(self.carrier, self.output, &geometry, self.config)?;
        let mut cursor = EmbeddingCursor::new(envelope);

        tracker.phase(0, 95);
        LsbFrameCodec::new(selection).embed(source, &mut sink, &mut cursor, tracker)?;
        drop(sink);

        tracker.phase(95, 100);
        let (output, mut warnings) = target.commit(self.carrier, &geometry, self.config)?;
        if output != self.output {
            warn!("Output renamed to {output:?} for lossless video");
            warnings.push(format!(
                "The output was written to {output:?}, lossless video needs a .mkv or .avi container"
            ));
        }

        Ok((output, warnings))
    }

    fn text_in_audio(
        &self,
        text: &str,
        options: &DctCodecOptions,
        tracker: &mut ProgressTracker,
    ) -> Result<HideOutcome, StegError> {
        let codec = DctCodec::new(options)?;
        let envelope = EnvelopeFormat::TerminatedText.encode(&Payload::from_text(text))?;
        let scratch = self.config.scratch_dir()?;
        let mut audio = load_audio(self.carrier, self.config, &scratch)?;
        ensure_fits(
            text.len() as u64,
            audio_dct(&audio.geometry(options.block_size)),
        )?;

        tracker.phase(0, 90);
        let mut samples = audio.channel(0);
        let mut cursor = EmbeddingCursor::new(envelope);
        let changed = codec.embed(&mut samples, &mut cursor, tracker)?;
        audio.set_channel(0, &samples);

        tracker.phase(90, 100);
        tracker.checkpoint()?;
        let mut warnings = Vec::new();
        match CarrierKind::of(self.carrier) {
            CarrierKind::Wav => {
                let mut target = NamedTempFile::new_in(parent_dir(self.output))
                    .map_err(|source| StegError::WriteError { source })?;
                audio.save_to_writer(std::io::BufWriter::new(target.as_file_mut()))?;
                target
                    .persist(self.output)
                    .map_err(|e| StegError::WriteError { source: e.error })?;
            }
            CarrierKind::Video => {
                let wav = scratch.path().join("stego-audio.wav");
                audio.save_as(&wav)?;
                let extension = self
                    .output
                    .extension()
                    .or_else(|| self.carrier.extension())
                    .and_then(|e| e.to_str())
                    .unwrap_or("mkv");
                let muxed = scratch.path().join(format!("muxed.{extension}"));
                Transcoder::new(self.config).mux_audio(self.carrier, &wav, &muxed)?;
                move_file(&muxed, self.output)?;
                if is_lossy_audio_container(self.output) {
                    warn!("Lossy audio codec chosen for {:?}", self.output);
                    warnings.push(format!(
                        "The audio of {:?} is stored with a lossy codec, the hidden text will likely not survive",
                        self.output
                    ));
                }
            }
            _ => return Err(StegError::UnsupportedCarrier),
        }

        Ok(HideOutcome {
            message: format!(
                "Hidden a text of {} characters in the audio of {:?}, {changed} blocks changed",
                text.chars().count(),
                self.output
            ),
            output: self.output.to_path_buf(),
            warnings,
            metadata: None,
        })
    }

    fn append(
        &self,
        payload: Payload,
        mut warnings: Vec<String>,
        tracker: &mut ProgressTracker,
    ) -> Result<HideOutcome, StegError> {
        let size = container::append(self.carrier, self.output, &payload, tracker)?;
        warnings.push(REENCODING_WARNING.to_string());

        Ok(HideOutcome {
            message: format!(
                "Appended {} bytes to {:?}, {size} bytes written",
                payload.len(),
                self.output
            ),
            output: self.output.to_path_buf(),
            warnings,
            metadata: payload.metadata,
        })
    }
}
