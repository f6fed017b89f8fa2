use log::debug;

use super::Dct;
use crate::bit_iterator::ByteAssembler;
use crate::cursor::EmbeddingCursor;
use crate::error::StegError;
use crate::media::codec_options::DctCodecOptions;
use crate::media::payload::{EnvelopeParser, ParseStatus, Payload};
use crate::progress::ProgressTracker;
use crate::result::Result;

/// Scale factors tried in turn on blocks that clip, the first one keeps the block as is
const HEADROOM_STEPS: [f64; 6] = [1.0, 0.9, 0.75, 0.5, 0.25, 0.1];

/// Frequency domain embedder, one bit per block of audio samples
///
/// A bit is the relation of two DCT coefficients of the block: `1` when the
/// low one is bigger, `0` otherwise. Embedding only touches blocks that do
/// not already hold the bit with at least `margin` distance, those get both
/// coefficients centered on their mean and pushed `margin` apart.
#[derive(Debug, Clone)]
pub struct DctCodec {
    dct: Dct,
    low: usize,
    high: usize,
    margin: f64,
}

impl DctCodec {
    pub fn new(options: &DctCodecOptions) -> Result<Self> {
        options.validate()?;
        let (low, high) = options.coefficients;

        Ok(Self {
            dct: Dct::new(options.block_size),
            low,
            high,
            margin: options.margin,
        })
    }

    pub fn block_size(&self) -> usize {
        self.dct.size()
    }

    pub fn capacity_bits(&self, samples: usize) -> usize {
        samples / self.block_size()
    }

    pub fn read_bit(&self, block: &[i16]) -> bool {
        self.dct.coefficient(self.low, block) > self.dct.coefficient(self.high, block)
    }

    /// stores `bit` in the block, returns whether samples had to change
    ///
    /// A block near full scale can clip while the coefficients are pushed
    /// apart. Such blocks are scaled down step by step, with a wider
    /// separation each time, until the bit reads back. A block that never
    /// does is left untouched and reported as `UnembeddableBlock`.
    pub fn embed_bit(&self, block: &mut [i16], bit: bool) -> Result<bool> {
        let low = self.dct.coefficient(self.low, block);
        let high = self.dct.coefficient(self.high, block);
        let holds = if bit {
            low > high + self.margin
        } else {
            low < high - self.margin
        };
        if holds {
            return Ok(false);
        }

        let original = block.to_vec();
        for (attempt, scale) in HEADROOM_STEPS.iter().enumerate() {
            let spread = self.margin * (attempt + 1) as f64;
            self.write_relation(&original, block, bit, *scale, spread);
            if self.read_bit(block) == bit {
                if attempt > 0 {
                    debug!("Block needed headroom, scaled by {scale}");
                }
                return Ok(true);
            }
        }
        block.copy_from_slice(&original);

        Err(StegError::UnembeddableBlock)
    }

    /// writes `original * scale` with the coefficient pair set `spread` apart
    fn write_relation(
        &self,
        original: &[i16],
        block: &mut [i16],
        bit: bool,
        scale: f64,
        spread: f64,
    ) {
        let low = self.dct.coefficient(self.low, original) * scale;
        let high = self.dct.coefficient(self.high, original) * scale;
        let mean = (low + high) / 2.0;
        let half = spread / 2.0;
        let (new_low, new_high) = if bit {
            (mean + half, mean - half)
        } else {
            (mean - half, mean + half)
        };

        // inverse transform of the coefficient change, all other coefficients only scale
        let delta_low = new_low - low;
        let delta_high = new_high - high;
        for (((sample, source), b_low), b_high) in block
            .iter_mut()
            .zip(original)
            .zip(self.dct.basis(self.low))
            .zip(self.dct.basis(self.high))
        {
            let value = f64::from(*source) * scale + delta_low * b_low + delta_high * b_high;
            *sample = value.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        }
    }

    /// embeds the envelope into consecutive blocks of one channel
    ///
    /// Blocks are written to a copy first, `samples` only changes when every
    /// bit is in place.
    pub fn embed(
        &self,
        samples: &mut [i16],
        cursor: &mut EmbeddingCursor,
        tracker: &mut ProgressTracker,
    ) -> Result<usize> {
        let available = self.capacity_bits(samples.len());
        let needed = cursor.remaining_bits();
        if needed > available {
            return Err(StegError::CapacityExceeded {
                needed: needed.div_ceil(8) as u64,
                available: (available / 8) as u64,
            });
        }

        let span = needed * self.block_size();
        let mut work = samples[..span].to_vec();
        let mut changed = 0;
        for (index, block) in work.chunks_exact_mut(self.block_size()).enumerate() {
            tracker.checkpoint()?;
            let Some(bit) = cursor.next_bit() else {
                break;
            };
            let embedded = self.embed_bit(block, bit).inspect_err(|_| {
                debug!("Block {index} cannot carry a bit");
            })?;
            if embedded {
                changed += 1;
            }
            tracker.update(index + 1, needed);
        }
        samples[..span].copy_from_slice(&work);
        debug!("Embedded {needed} bits, {changed} blocks changed");

        Ok(changed)
    }

    /// reads blocks until the parser has a complete envelope
    pub fn extract(
        &self,
        samples: &[i16],
        mut parser: EnvelopeParser,
        tracker: &mut ProgressTracker,
    ) -> Result<Payload> {
        let total = self.capacity_bits(samples.len());
        let mut assembler = ByteAssembler::new();

        for (index, block) in samples.chunks_exact(self.block_size()).enumerate() {
            tracker.checkpoint()?;
            tracker.update(index + 1, total);
            if let Some(byte) = assembler.push_bit(self.read_bit(block)) {
                if parser.push(byte)? == ParseStatus::Complete {
                    break;
                }
            }
        }

        parser.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::payload::EnvelopeFormat;

    fn tone(len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let t = i as f64 / 44100.0;
                ((2.0 * std::f64::consts::PI * 440.0 * t).sin() * 8000.0
                    + (2.0 * std::f64::consts::PI * 1250.0 * t).sin() * 3000.0) as i16
            })
            .collect()
    }

    fn codec() -> DctCodec {
        DctCodec::new(&DctCodecOptions::default()).unwrap()
    }

    #[test]
    fn test_embedded_bit_is_read_back() {
        let codec = codec();
        let mut block = tone(128);

        for bit in [true, false, true, true, false] {
            codec.embed_bit(&mut block, bit).unwrap();
            assert_eq!(codec.read_bit(&block), bit);
        }
    }

    #[test]
    fn test_satisfied_block_is_untouched() {
        let codec = codec();
        let mut block = tone(128);
        codec.embed_bit(&mut block, true).unwrap();
        let embedded = block.clone();

        assert!(!codec.embed_bit(&mut block, true).unwrap());
        assert_eq!(block, embedded);
    }

    #[test]
    fn test_round_trip_and_tail_untouched() {
        let codec = codec();
        let original = tone(128 * 400);
        let mut samples = original.clone();
        let envelope = EnvelopeFormat::TerminatedText
            .encode(&Payload::from_text("HELLO"))
            .unwrap();
        let bits = envelope.len() * 8;
        let mut cursor = EmbeddingCursor::new(envelope);

        codec
            .embed(&mut samples, &mut cursor, &mut ProgressTracker::silent())
            .unwrap();
        assert!(cursor.is_exhausted());
        assert_eq!(&samples[bits * 128..], &original[bits * 128..]);

        let payload = codec
            .extract(
                &samples,
                EnvelopeFormat::TerminatedText.parser(),
                &mut ProgressTracker::silent(),
            )
            .unwrap();
        assert_eq!(payload.data, b"HELLO");
    }

    #[test]
    fn test_survives_noise_below_half_margin() {
        let codec = codec();
        let mut samples = tone(128 * 300);
        let envelope = EnvelopeFormat::TerminatedText
            .encode(&Payload::from_text("robust"))
            .unwrap();
        let mut cursor = EmbeddingCursor::new(envelope);
        codec
            .embed(&mut samples, &mut cursor, &mut ProgressTracker::silent())
            .unwrap();

        // |noise| <= 15 moves a coefficient by at most 15 * sqrt(128) < margin / 2
        for (i, sample) in samples.iter_mut().enumerate() {
            let noise = ((i * 7919 + 13) % 31) as i16 - 15;
            *sample = sample.saturating_add(noise);
        }

        let payload = codec
            .extract(
                &samples,
                EnvelopeFormat::TerminatedText.parser(),
                &mut ProgressTracker::silent(),
            )
            .unwrap();
        assert_eq!(payload.data, b"robust");
    }

    #[test]
    fn test_insufficient_blocks_fail_before_writing() {
        let codec = codec();
        let original = tone(128 * 100);
        let mut samples = original.clone();
        let envelope = EnvelopeFormat::TerminatedText
            .encode(&Payload::from_text("HELLO"))
            .unwrap();
        let mut cursor = EmbeddingCursor::new(envelope);

        let result = codec.embed(&mut samples, &mut cursor, &mut ProgressTracker::silent());

        assert!(matches!(
            result,
            Err(StegError::CapacityExceeded {
                needed: 23,
                available: 12
            })
        ));
        assert_eq!(samples, original);
    }

    fn square(len: usize, half_period: usize) -> Vec<i16> {
        (0..len)
            .map(|i| {
                if (i / half_period) % 2 == 0 {
                    i16::MAX
                } else {
                    i16::MIN
                }
            })
            .collect()
    }

    #[test]
    fn test_full_scale_blocks_keep_their_bit() {
        let codec = codec();
        let carrier = square(128 * 64, 220);

        for (index, original) in carrier.chunks_exact(128).enumerate() {
            for bit in [true, false] {
                let mut block = original.to_vec();
                codec.embed_bit(&mut block, bit).unwrap();
                assert_eq!(codec.read_bit(&block), bit, "block {index}, bit {bit}");
            }
        }
    }

    #[test]
    fn test_full_scale_square_wave_round_trip() {
        let codec = codec();
        let mut samples = square(128 * 200, 220);
        let envelope = EnvelopeFormat::TerminatedText
            .encode(&Payload::from_text("HELLO"))
            .unwrap();
        let mut cursor = EmbeddingCursor::new(envelope);

        codec
            .embed(&mut samples, &mut cursor, &mut ProgressTracker::silent())
            .unwrap();

        let payload = codec
            .extract(
                &samples,
                EnvelopeFormat::TerminatedText.parser(),
                &mut ProgressTracker::silent(),
            )
            .unwrap();
        assert_eq!(payload.data, b"HELLO");
    }
}
