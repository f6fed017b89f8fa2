use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use crate::capacity::CarrierDescriptor;
use crate::config::EngineConfig;
use crate::error::StegError;
use crate::media::audio::{probe_wav, WavAudio};
use crate::media::video::{
    lossless_output_path, FrameSequenceReader, FrameSequenceWriter, FrameSource, VideoFrames,
    VideoGeometry, VideoSink,
};
use crate::media::{CarrierKind, CodecOptions};
use crate::result::Result;
use crate::transcoder::Transcoder;

pub(crate) fn ensure_carrier_exists(carrier: &Path) -> Result<()> {
    if !carrier.exists() {
        return Err(StegError::CarrierUnreadable(format!(
            "{carrier:?} does not exist"
        )));
    }

    Ok(())
}

pub(crate) fn open_frames(carrier: &Path, config: &EngineConfig) -> Result<VideoFrames> {
    ensure_carrier_exists(carrier)?;
    match CarrierKind::of(carrier) {
        CarrierKind::FrameSequence => Ok(FrameSequenceReader::open(carrier)?.into()),
        CarrierKind::Video => Ok(Transcoder::new(config).open_frames(carrier)?.into()),
        _ => Err(StegError::UnsupportedCarrier),
    }
}

/// 16 bit PCM audio of a WAV file or of the first audio stream of a video
pub(crate) fn load_audio(carrier: &Path, config: &EngineConfig, scratch: &TempDir) -> Result<WavAudio> {
    ensure_carrier_exists(carrier)?;
    match CarrierKind::of(carrier) {
        CarrierKind::Wav => WavAudio::open(carrier),
        CarrierKind::Video => {
            let wav = scratch.path().join("carrier-audio.wav");
            Transcoder::new(config).extract_audio(carrier, &wav)?;
            WavAudio::open(&wav)
        }
        _ => Err(StegError::UnsupportedCarrier),
    }
}

/// carrier geometry as the capacity math of `options` needs it
pub(crate) fn describe(
    carrier: &Path,
    options: &CodecOptions,
    config: &EngineConfig,
) -> Result<CarrierDescriptor> {
    ensure_carrier_exists(carrier)?;
    match options {
        CodecOptions::FrameLsb(_) | CodecOptions::TextLsb(_) => {
            Ok(CarrierDescriptor::Video(video_geometry(carrier, config)?))
        }
        CodecOptions::AudioDct(dct) => {
            let geometry = match CarrierKind::of(carrier) {
                CarrierKind::Wav => probe_wav(carrier, dct.block_size)?,
                CarrierKind::Video => {
                    let scratch = config.scratch_dir()?;
                    load_audio(carrier, config, &scratch)?.geometry(dct.block_size)
                }
                _ => return Err(StegError::UnsupportedCarrier),
            };
            Ok(CarrierDescriptor::Audio(geometry))
        }
        CodecOptions::ContainerAppend => {
            let len = fs::metadata(carrier)
                .map_err(|e| StegError::CarrierUnreadable(format!("{carrier:?}: {e}")))?
                .len();
            Ok(CarrierDescriptor::Container { len })
        }
    }
}

fn video_geometry(carrier: &Path, config: &EngineConfig) -> Result<VideoGeometry> {
    match CarrierKind::of(carrier) {
        CarrierKind::FrameSequence => Ok(FrameSequenceReader::open(carrier)?.geometry().clone()),
        CarrierKind::Video => Transcoder::new(config).probe(carrier),
        _ => Err(StegError::UnsupportedCarrier),
    }
}

/// Where re-encoded frames go before they are moved to the requested output
pub(crate) struct FrameTarget {
    kind: FrameTargetKind,
    output: PathBuf,
    staging: PathBuf,
    _scratch: TempDir,
}

enum FrameTargetKind {
    Sequence,
    Video,
}

impl FrameTarget {
    /// a frame directory for frame sequence carriers, a lossless video file otherwise
    pub(crate) fn prepare(
        carrier: &Path,
        output: &Path,
        geometry: &VideoGeometry,
        config: &EngineConfig,
    ) -> Result<(Self, VideoSink)> {
        match CarrierKind::of(carrier) {
            CarrierKind::FrameSequence => {
                if output.exists() && !is_empty_dir(output) {
                    return Err(StegError::WriteError {
                        source: std::io::Error::new(
                            std::io::ErrorKind::AlreadyExists,
                            format!("{output:?} exists and is not an empty directory"),
                        ),
                    });
                }
                let parent = parent_dir(output);
                let scratch = tempfile::Builder::new()
                    .prefix(".stegavid-frames-")
                    .tempdir_in(parent)
                    .map_err(|source| StegError::WriteError { source })?;
                let staging = scratch.path().join("frames");
                let sink = FrameSequenceWriter::create(&staging)?;

                Ok((
                    Self {
                        kind: FrameTargetKind::Sequence,
                        output: output.to_path_buf(),
                        staging,
                        _scratch: scratch,
                    },
                    sink.into(),
                ))
            }
            CarrierKind::Video => {
                let output = lossless_output_path(output);
                let scratch = config.scratch_dir()?;
                let extension = output
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("mkv")
                    .to_string();
                let staging = scratch.path().join(format!("frames.{extension}"));
                let sink = Transcoder::new(config).create_encoder(&staging, geometry)?;

                Ok((
                    Self {
                        kind: FrameTargetKind::Video,
                        output,
                        staging,
                        _scratch: scratch,
                    },
                    sink.into(),
                ))
            }
            _ => Err(StegError::UnsupportedCarrier),
        }
    }

    /// moves the staged frames to the output, the audio of the carrier is muxed back in
    /// when possible, returns the final output path and warnings
    pub(crate) fn commit(
        self,
        carrier: &Path,
        geometry: &VideoGeometry,
        config: &EngineConfig,
    ) -> Result<(PathBuf, Vec<String>)> {
        let mut warnings = Vec::new();
        match self.kind {
            FrameTargetKind::Sequence => {
                if self.output.is_dir() {
                    fs::remove_dir(&self.output).map_err(|source| StegError::WriteError { source })?;
                }
                fs::rename(&self.staging, &self.output)
                    .map_err(|source| StegError::WriteError { source })?;
            }
            FrameTargetKind::Video => {
                let mut muxed = false;
                if geometry.has_audio {
                    match Transcoder::new(config).mux_audio(&self.staging, carrier, &self.output) {
                        Ok(()) => muxed = true,
                        Err(e) => {
                            warn!("Could not carry the audio over: {e}");
                            warnings.push(format!("The output has no audio, remuxing failed: {e}"));
                        }
                    }
                }
                if !muxed {
                    move_file(&self.staging, &self.output)?;
                }
            }
        }
        debug!("Frames written to {:?}", self.output);

        Ok((self.output, warnings))
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// rename, falling back to copy when source and target are on different file systems
pub(crate) fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|source| {
        let _ = fs::remove_file(to);
        StegError::WriteError { source }
    })?;

    Ok(())
}
