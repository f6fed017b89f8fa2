use std::collections::VecDeque;

use enum_dispatch::enum_dispatch;

use super::{
    Frame, FrameSequenceReader, FrameSequenceWriter, RawVideoReader, RawVideoWriter,
    VideoGeometry, BGR_CHANNELS,
};
use crate::error::StegError;
use crate::result::Result;

/// Hands out decoded frames one after the other
#[enum_dispatch]
pub trait FrameSource {
    fn geometry(&self) -> &VideoGeometry;

    /// `None` once the carrier has no more frames
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Takes frames in order and writes them into the output carrier
#[enum_dispatch]
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// flushes and closes the output, no frame may be written afterwards
    fn finish(&mut self) -> Result<()>;
}

#[enum_dispatch(FrameSource)]
pub enum VideoFrames {
    Memory(MemoryFrames),
    Sequence(FrameSequenceReader),
    Pipe(RawVideoReader),
}

#[enum_dispatch(FrameSink)]
pub enum VideoSink {
    Memory(MemoryFrameSink),
    Sequence(FrameSequenceWriter),
    Pipe(RawVideoWriter),
}

/// Frames held in memory, mostly for tests and benchmarks
pub struct MemoryFrames {
    geometry: VideoGeometry,
    frames: VecDeque<Frame>,
}

impl MemoryFrames {
    pub fn new(frames: Vec<Frame>, fps: f64) -> Result<Self> {
        let Some(first) = frames.first() else {
            return Err(StegError::CarrierUnreadable("no frames".to_string()));
        };
        let (width, height) = (first.width(), first.height());
        if frames
            .iter()
            .any(|f| f.width() != width || f.height() != height)
        {
            return Err(StegError::CarrierUnreadable(
                "frames differ in size".to_string(),
            ));
        }
        let geometry = VideoGeometry {
            frame_count: frames.len(),
            width,
            height,
            channels: BGR_CHANNELS,
            fps,
            has_audio: false,
        };
        geometry.validate()?;

        Ok(Self {
            geometry,
            frames: frames.into(),
        })
    }
}

impl FrameSource for MemoryFrames {
    fn geometry(&self) -> &VideoGeometry {
        &self.geometry
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

#[derive(Debug, Default)]
pub struct MemoryFrameSink {
    frames: Vec<Frame>,
    finished: bool,
}

impl MemoryFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl FrameSink for MemoryFrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_frames_report_geometry() {
        let frames = vec![Frame::blank(4, 2); 3];
        let mut source = VideoFrames::from(MemoryFrames::new(frames, 25.0).unwrap());

        assert_eq!(source.geometry().frame_count, 3);
        assert_eq!(source.geometry().frame_len(), 24);
        let mut count = 0;
        while source.next_frame().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_memory_frames_must_share_size() {
        let frames = vec![Frame::blank(4, 2), Frame::blank(2, 4)];
        assert!(MemoryFrames::new(frames, 25.0).is_err());
        assert!(MemoryFrames::new(Vec::new(), 25.0).is_err());
    }
}
