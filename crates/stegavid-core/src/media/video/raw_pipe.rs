use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use super::{Frame, FrameSink, FrameSource, VideoGeometry};
use crate::error::StegError;
use crate::result::Result;
use crate::transcoder::{failed, spawn_error, ToolOutput};

/// Decodes a video file with ffmpeg into raw `bgr24` frames read from a pipe
pub struct RawVideoReader {
    geometry: VideoGeometry,
    program: PathBuf,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr: Option<StderrDrain>,
}

impl RawVideoReader {
    pub(crate) fn spawn(ffmpeg: &Path, video: &Path, geometry: VideoGeometry) -> Result<Self> {
        debug!("Decoding {video:?} with {ffmpeg:?}");
        let mut child = Command::new(ffmpeg)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(video)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "bgr24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(ffmpeg, e))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take().map(StderrDrain::spawn);

        Ok(Self {
            geometry,
            program: ffmpeg.to_path_buf(),
            child: Some(child),
            stdout,
            stderr,
        })
    }

    /// waits for the decoder and reports a failed run
    fn close(&mut self) -> Result<()> {
        self.stdout = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let output = finish_child(&mut child, self.stderr.take())?;
        if !output.success() {
            return Err(failed(&self.program, &output));
        }

        Ok(())
    }
}

impl FrameSource for RawVideoReader {
    fn geometry(&self) -> &VideoGeometry {
        &self.geometry
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };
        let mut buffer = vec![0u8; self.geometry.frame_len()];
        let filled = read_full(stdout, &mut buffer)?;

        if filled == buffer.len() {
            return Frame::new(self.geometry.width, self.geometry.height, buffer).map(Some);
        }
        self.close()?;
        if filled > 0 {
            return Err(StegError::CarrierUnreadable(format!(
                "decoder delivered an incomplete frame of {filled} bytes"
            )));
        }

        Ok(None)
    }
}

impl Drop for RawVideoReader {
    fn drop(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            // extraction stops reading once the payload is complete
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Reads a child's stderr on its own thread, a full pipe would block ffmpeg
struct StderrDrain {
    handle: JoinHandle<Vec<u8>>,
}

impl StderrDrain {
    fn spawn<R: Read + Send + 'static>(mut stderr: R) -> Self {
        let handle = thread::spawn(move || {
            let mut buffer = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut buffer) {
                debug!("Stopped reading tool stderr: {e}");
            }
            buffer
        });

        Self { handle }
    }

    /// returns all collected output once the writing end is closed
    fn collect(self) -> Vec<u8> {
        self.handle.join().unwrap_or_default()
    }
}

fn finish_child(child: &mut Child, stderr: Option<StderrDrain>) -> Result<ToolOutput> {
    let status = child.wait()?;

    Ok(ToolOutput {
        status: status.code(),
        stdout: Vec::new(),
        stderr: stderr.map(StderrDrain::collect).unwrap_or_default(),
    })
}

fn read_full<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(StegError::ReadError { source }),
        }
    }

    Ok(filled)
}

/// Encodes raw `bgr24` frames written to a pipe with the lossless FFV1 codec
pub struct RawVideoWriter {
    program: PathBuf,
    output: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr: Option<StderrDrain>,
}

impl RawVideoWriter {
    pub(crate) fn spawn(ffmpeg: &Path, output: &Path, geometry: &VideoGeometry) -> Result<Self> {
        debug!("Encoding {output:?} with {ffmpeg:?}");
        let size = format!("{}x{}", geometry.width, geometry.height);
        let rate = geometry.fps.to_string();
        let mut child = Command::new(ffmpeg)
            .args(["-v", "error", "-y", "-f", "rawvideo", "-pix_fmt", "bgr24"])
            .args(["-s", size.as_str(), "-r", rate.as_str()])
            .args(["-i", "-", "-an", "-c:v", "ffv1", "-level", "3"])
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(ffmpeg, e))?;
        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(StderrDrain::spawn);

        Ok(Self {
            program: ffmpeg.to_path_buf(),
            output: output.to_path_buf(),
            child: Some(child),
            stdin,
            stderr,
        })
    }

    fn wait(&mut self) -> Result<()> {
        self.stdin = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let output = finish_child(&mut child, self.stderr.take())?;
        if !output.success() {
            let _ = std::fs::remove_file(&self.output);
            return Err(failed(&self.program, &output));
        }

        Ok(())
    }
}

impl FrameSink for RawVideoWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StegError::WriteError {
                source: std::io::Error::from(ErrorKind::BrokenPipe),
            });
        };
        if let Err(source) = stdin.write_all(frame.samples()) {
            warn!("Encoder stopped taking frames: {source}");
            // a dead encoder explains itself on stderr
            self.wait()?;
            return Err(StegError::WriteError { source });
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.wait()
    }
}

impl Drop for RawVideoWriter {
    fn drop(&mut self) {
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            let _ = std::fs::remove_file(&self.output);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_stderr_is_collected_completely() {
        let noise: Vec<u8> = (0..1 << 20).map(|i| (i % 251) as u8).collect();

        let drain = StderrDrain::spawn(Cursor::new(noise.clone()));

        assert_eq!(drain.collect(), noise);
    }

    #[cfg(unix)]
    #[test]
    fn test_chatty_child_does_not_block() {
        // writes far more than a pipe buffer holds before exiting
        let mut child = Command::new("sh")
            .args(["-c", "head -c 262144 /dev/zero >&2; exit 3"])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let drain = child.stderr.take().map(StderrDrain::spawn);

        let output = finish_child(&mut child, drain).unwrap();

        assert_eq!(output.status, Some(3));
        assert_eq!(output.stderr.len(), 262144);
        assert!(!output.success());
    }
}
