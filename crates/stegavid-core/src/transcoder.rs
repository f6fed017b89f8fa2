//! External media toolkit invocation.
//!
//! Everything that needs a real video codec goes through `ffmpeg` and
//! `ffprobe` child processes. Short runs use a [`ToolInvoker`], an explicit
//! argument vector in and exit status plus captured output back, so tests
//! can replace the processes. Frame streaming spawns its own pipes, see
//! [`crate::media::video::RawVideoReader`].

use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error};
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::StegError;
use crate::media::video::{RawVideoReader, RawVideoWriter, VideoGeometry, BGR_CHANNELS};
use crate::result::Result;

/// What a finished tool run left behind
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

pub trait ToolInvoker {
    /// runs `program` with `args` to completion, no shell is involved
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl ToolInvoker for ProcessInvoker {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput> {
        debug!("Running {program:?} {args:?}");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(program, e))?;

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

pub(crate) fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .to_string()
}

pub(crate) fn spawn_error(program: &Path, e: std::io::Error) -> StegError {
    if e.kind() == ErrorKind::NotFound {
        StegError::ExternalToolUnavailable {
            tool: tool_name(program),
        }
    } else {
        error!("Error starting {program:?}: {e}");
        StegError::IoError(e)
    }
}

pub(crate) fn failed(program: &Path, output: &ToolOutput) -> StegError {
    StegError::ExternalToolFailed {
        tool: tool_name(program),
        status: output.status,
        stderr: output.stderr_lossy(),
    }
}

/// audio codec that fits the container of `output`
pub fn audio_codec_for(output: &Path) -> &'static str {
    match output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("mp4") | Some("m4v") => "aac",
        Some("mkv") => "flac",
        _ => "pcm_s16le",
    }
}

/// whether the audio codec for `output` loses information
pub fn is_lossy_audio_container(output: &Path) -> bool {
    audio_codec_for(output) == "aac"
}

pub struct Transcoder<I: ToolInvoker = ProcessInvoker> {
    invoker: I,
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Transcoder<ProcessInvoker> {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_invoker(config, ProcessInvoker)
    }
}

impl<I: ToolInvoker> Transcoder<I> {
    pub fn with_invoker(config: &EngineConfig, invoker: I) -> Self {
        Self {
            invoker,
            ffmpeg: config.ffmpeg.clone(),
            ffprobe: config.ffprobe.clone(),
        }
    }

    /// frame count, size, rate and audio presence of a video file
    pub fn probe(&self, video: &Path) -> Result<VideoGeometry> {
        let args = args([
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-count_packets"),
            OsStr::new("-show_entries"),
            OsStr::new("stream=codec_type,width,height,r_frame_rate,avg_frame_rate,nb_frames,nb_read_packets"),
            OsStr::new("-of"),
            OsStr::new("json"),
            video.as_os_str(),
        ]);
        let output = self.invoker.run(&self.ffprobe, &args)?;
        if !output.success() {
            return Err(StegError::CarrierUnreadable(format!(
                "{video:?}: {}",
                output.stderr_lossy()
            )));
        }
        let geometry = parse_probe(&output.stdout)?;
        debug!("Probed {video:?}: {geometry:?}");

        Ok(geometry)
    }

    /// first audio stream of `video` as 16 bit PCM WAV
    pub fn extract_audio(&self, video: &Path, wav: &Path) -> Result<()> {
        let args = args([
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-y"),
            OsStr::new("-i"),
            video.as_os_str(),
            OsStr::new("-map"),
            OsStr::new("0:a:0"),
            OsStr::new("-vn"),
            OsStr::new("-acodec"),
            OsStr::new("pcm_s16le"),
            wav.as_os_str(),
        ]);
        self.run_producing(&self.ffmpeg, &args, wav)
    }

    /// video stream of `video` copied, audio taken from `audio`
    pub fn mux_audio(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        let args = args([
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-y"),
            OsStr::new("-i"),
            video.as_os_str(),
            OsStr::new("-i"),
            audio.as_os_str(),
            OsStr::new("-map"),
            OsStr::new("0:v:0"),
            OsStr::new("-map"),
            OsStr::new("1:a:0"),
            OsStr::new("-c:v"),
            OsStr::new("copy"),
            OsStr::new("-c:a"),
            OsStr::new(audio_codec_for(output)),
            output.as_os_str(),
        ]);
        self.run_producing(&self.ffmpeg, &args, output)
    }

    /// a decoder that streams the frames of `video` as raw BGR
    pub fn open_frames(&self, video: &Path) -> Result<RawVideoReader> {
        let geometry = self.probe(video)?;
        geometry.validate()?;

        RawVideoReader::spawn(&self.ffmpeg, video, geometry)
    }

    /// an FFV1 encoder taking raw BGR frames of `geometry`
    pub fn create_encoder(&self, output: &Path, geometry: &VideoGeometry) -> Result<RawVideoWriter> {
        RawVideoWriter::spawn(&self.ffmpeg, output, geometry)
    }

    /// runs a tool expected to create `output`, which is removed again when the run fails
    fn run_producing(&self, program: &Path, args: &[OsString], output: &Path) -> Result<()> {
        let result = self.invoker.run(program, args).and_then(|out| {
            if out.success() {
                Ok(())
            } else {
                Err(failed(program, &out))
            }
        });
        if result.is_err() && output.exists() {
            let _ = std::fs::remove_file(output);
        }

        result
    }
}

fn args<'a>(parts: impl IntoIterator<Item = &'a OsStr>) -> Vec<OsString> {
    parts.into_iter().map(OsStr::to_os_string).collect()
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    nb_read_packets: Option<String>,
}

fn parse_probe(json: &[u8]) -> Result<VideoGeometry> {
    let probe: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| StegError::CarrierUnreadable(format!("unexpected ffprobe output: {e}")))?;
    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));
    let Some(video) = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
    else {
        return Err(StegError::CarrierUnreadable("no video stream".to_string()));
    };

    let fps = [&video.r_frame_rate, &video.avg_frame_rate]
        .into_iter()
        .filter_map(|rate| rate.as_deref().and_then(parse_rate))
        .next()
        .ok_or_else(|| StegError::CarrierUnreadable("unknown frame rate".to_string()))?;
    let frame_count = [&video.nb_read_packets, &video.nb_frames]
        .into_iter()
        .filter_map(|count| count.as_deref().and_then(|c| c.parse::<usize>().ok()))
        .find(|count| *count > 0)
        .ok_or_else(|| StegError::CarrierUnreadable("unknown frame count".to_string()))?;

    let geometry = VideoGeometry {
        frame_count,
        width: video.width.unwrap_or_default(),
        height: video.height.unwrap_or_default(),
        channels: BGR_CHANNELS,
        fps,
        has_audio,
    };
    geometry.validate()?;

    Ok(geometry)
}

/// `30000/1001` or `25`
fn parse_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.trim().parse::<f64>().ok()? / den
        }
        None => rate.trim().parse().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}
