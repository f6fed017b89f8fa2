use log::debug;

use super::{Frame, FrameSink, FrameSource, VideoGeometry, BGR_CHANNELS};
use crate::bit_iterator::ByteAssembler;
use crate::cursor::EmbeddingCursor;
use crate::error::StegError;
use crate::media::codec_options::ChannelSelection;
use crate::media::payload::{EnvelopeParser, ParseStatus, Payload};
use crate::media::primitives::{HideBit, UnveilBit};
use crate::progress::ProgressTracker;
use crate::result::Result;

/// Spatial LSB embedder, one envelope bit per selected 8 bit sample
///
/// Samples are visited frame by frame in row major order, channel interleaved.
/// With [`ChannelSelection::Single`] only every third sample, starting at the
/// channel index, is used. Once the envelope is written all further frames
/// pass through untouched.
#[derive(Debug, Clone, Copy)]
pub struct LsbFrameCodec {
    selection: ChannelSelection,
}

impl LsbFrameCodec {
    pub fn new(selection: ChannelSelection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> ChannelSelection {
        self.selection
    }

    pub fn bits_per_frame(&self, geometry: &VideoGeometry) -> usize {
        geometry.width as usize
            * geometry.height as usize
            * self.selection.channels_used(geometry.channels)
    }

    /// bits all frames of the carrier can take
    pub fn capacity_bits(&self, geometry: &VideoGeometry) -> usize {
        self.bits_per_frame(geometry) * geometry.frame_count
    }

    /// writes the next envelope bits into one frame, returns how many were written
    pub fn embed_frame(&self, frame: &mut Frame, cursor: &mut EmbeddingCursor) -> usize {
        let mut written = 0;
        for sample in self.selected_mut(frame) {
            let Some(bit) = cursor.next_bit() else {
                break;
            };
            sample.hide_bit(bit);
            written += 1;
        }

        written
    }

    /// feeds the bits of one frame into the parser, stops as soon as it completes
    pub fn extract_frame(
        &self,
        frame: &Frame,
        assembler: &mut ByteAssembler,
        parser: &mut EnvelopeParser,
    ) -> Result<ParseStatus> {
        for sample in self.selected(frame) {
            if let Some(byte) = assembler.push_bit(sample.unveil_bit()) {
                if parser.push(byte)? == ParseStatus::Complete {
                    return Ok(ParseStatus::Complete);
                }
            }
        }

        Ok(ParseStatus::NeedMore)
    }

    /// embeds the whole envelope, every source frame ends up in the sink
    pub fn embed<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        cursor: &mut EmbeddingCursor,
        tracker: &mut ProgressTracker,
    ) -> Result<usize>
    where
        S: FrameSource,
        K: FrameSink,
    {
        let geometry = source.geometry().clone();
        let available = self.capacity_bits(&geometry);
        if cursor.remaining_bits() > available {
            return Err(StegError::CapacityExceeded {
                needed: cursor.remaining_bits().div_ceil(8) as u64,
                available: (available / 8) as u64,
            });
        }
        debug!(
            "Embedding {} bits into {} frames of {} bits",
            cursor.total_bits(),
            geometry.frame_count,
            self.bits_per_frame(&geometry)
        );

        let mut frames = 0;
        while let Some(mut frame) = source.next_frame()? {
            tracker.checkpoint()?;
            if !cursor.is_exhausted() {
                self.embed_frame(&mut frame, cursor);
            }
            sink.write_frame(&frame)?;
            frames += 1;
            tracker.update(frames, geometry.frame_count);
        }
        if !cursor.is_exhausted() {
            // the carrier delivered fewer frames than it announced
            return Err(StegError::CapacityExceeded {
                needed: cursor.total_bits().div_ceil(8) as u64,
                available: (cursor.bits_written() / 8) as u64,
            });
        }
        sink.finish()?;

        Ok(frames)
    }

    /// reads frames until the parser has a complete envelope
    pub fn extract<S: FrameSource>(
        &self,
        source: &mut S,
        mut parser: EnvelopeParser,
        tracker: &mut ProgressTracker,
    ) -> Result<Payload> {
        let total = source.geometry().frame_count;
        let mut assembler = ByteAssembler::new();
        let mut frames = 0;

        while let Some(frame) = source.next_frame()? {
            tracker.checkpoint()?;
            let status = self.extract_frame(&frame, &mut assembler, &mut parser)?;
            frames += 1;
            tracker.update(frames, total);
            if status == ParseStatus::Complete {
                break;
            }
        }
        debug!("Read {frames} frames, {} bytes recovered", parser.consumed());

        parser.finish()
    }

    fn selected_mut<'a>(&self, frame: &'a mut Frame) -> Box<dyn Iterator<Item = &'a mut u8> + 'a> {
        match self.selection {
            ChannelSelection::All => Box::new(frame.samples_mut().iter_mut()),
            ChannelSelection::Single(channel) => Box::new(
                frame
                    .samples_mut()
                    .iter_mut()
                    .skip(channel)
                    .step_by(BGR_CHANNELS),
            ),
        }
    }

    fn selected<'a>(&self, frame: &'a Frame) -> Box<dyn Iterator<Item = &'a u8> + 'a> {
        match self.selection {
            ChannelSelection::All => Box::new(frame.samples().iter()),
            ChannelSelection::Single(channel) => {
                Box::new(frame.samples().iter().skip(channel).step_by(BGR_CHANNELS))
            }
        }
    }
}
