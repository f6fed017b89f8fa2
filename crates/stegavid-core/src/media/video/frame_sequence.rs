use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error};

use super::{Frame, FrameSink, FrameSource, VideoGeometry, BGR_CHANNELS};
use crate::error::StegError;
use crate::result::Result;

/// PNG sequences carry no timing, this rate is assumed
pub const SEQUENCE_FPS: f64 = 30.0;

/// A directory of PNG files, one frame each, ordered by file name
pub struct FrameSequenceReader {
    geometry: VideoGeometry,
    files: std::vec::IntoIter<PathBuf>,
}

impl FrameSequenceReader {
    pub fn open(dir: &Path) -> Result<Self> {
        let files = list_png_files(dir)?;
        let Some(first) = files.first() else {
            return Err(StegError::CarrierUnreadable(format!(
                "no PNG frames found in {dir:?}"
            )));
        };
        let (width, height) = image::image_dimensions(first)
            .map_err(|e| StegError::CarrierUnreadable(format!("{first:?}: {e}")))?;
        let geometry = VideoGeometry {
            frame_count: files.len(),
            width,
            height,
            channels: BGR_CHANNELS,
            fps: SEQUENCE_FPS,
            has_audio: false,
        };
        geometry.validate()?;
        debug!("Frame sequence {dir:?}: {geometry:?}");

        Ok(Self {
            geometry,
            files: files.into_iter(),
        })
    }
}

impl FrameSource for FrameSequenceReader {
    fn geometry(&self) -> &VideoGeometry {
        &self.geometry
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.files.next() else {
            return Ok(None);
        };
        let image = image::open(&path)
            .map_err(|e| StegError::CarrierUnreadable(format!("{path:?}: {e}")))?
            .to_rgb8();
        if image.dimensions() != (self.geometry.width, self.geometry.height) {
            return Err(StegError::CarrierUnreadable(format!(
                "{path:?} differs in size from the first frame"
            )));
        }

        Ok(Some(Frame::from_rgb_image(&image)))
    }
}

fn list_png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| StegError::CarrierUnreadable(format!("{dir:?}: {e}")))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| StegError::ReadError { source })?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if is_png && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Writes frames as `frame_000000.png`, `frame_000001.png`, .. into a directory
pub struct FrameSequenceWriter {
    dir: PathBuf,
    index: usize,
}

impl FrameSequenceWriter {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|source| {
            error!("Error creating frame directory {dir:?}: {source}");
            StegError::WriteError { source }
        })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            index: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.index
    }
}

impl FrameSink for FrameSequenceWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.index));
        frame
            .to_rgb_image()
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| {
                error!("Error saving frame {path:?}: {e}");
                StegError::WriteError {
                    source: std::io::Error::other(e),
                }
            })?;
        self.index += 1;

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
