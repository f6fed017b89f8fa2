//! Maximum payload size per method and carrier.
//!
//! The numbers are a policy on top of the raw bit count: the file method
//! keeps trailing frames and a metadata reserve free, the text method only
//! counts a fraction of the frames. Embedders additionally check the raw bit
//! count of the carrier before they write anything.

use std::fmt::{self, Display, Formatter};

use log::debug;
use stegavid_cipher::max_plaintext_len;

use crate::error::StegError;
use crate::media::audio::AudioGeometry;
use crate::media::container::NOMINAL_CAPACITY;
use crate::media::payload::{EnvelopeFormat, METADATA_RESERVE};
use crate::media::video::VideoGeometry;
use crate::media::{ChannelSelection, CodecOptions, FrameLsbOptions, TextLsbOptions};
use crate::result::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityUnit {
    Bytes,
    /// UTF-8 bytes of a text message
    Characters,
}

/// Geometry of a carrier as far as capacity is concerned
#[derive(Debug, Clone, PartialEq)]
pub enum CarrierDescriptor {
    Video(VideoGeometry),
    Audio(AudioGeometry),
    Container { len: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapacityReport {
    pub capacity: u64,
    pub unit: CapacityUnit,
    pub descriptor: CarrierDescriptor,
}

/// How much of a carrier a payload of a given size takes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityUsage {
    pub needed: u64,
    pub remaining: u64,
    /// share of the capacity taken, above 100 when the payload does not fit
    pub percent_used: f64,
}

impl CapacityUsage {
    pub fn fits(&self) -> bool {
        self.percent_used <= 100.0
    }
}

impl CapacityReport {
    /// usage of this capacity by a payload of `needed` units
    pub fn usage(&self, needed: u64) -> CapacityUsage {
        let percent_used = match self.capacity {
            0 if needed == 0 => 0.0,
            0 => f64::INFINITY,
            capacity => needed as f64 * 100.0 / capacity as f64,
        };

        CapacityUsage {
            needed,
            remaining: self.capacity.saturating_sub(needed),
            percent_used,
        }
    }
}

impl Display for CapacityUsage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} needed, {:.1}% used, {} remaining",
            self.needed, self.percent_used, self.remaining
        )
    }
}

impl Display for CapacityReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            CapacityUnit::Bytes => "bytes",
            CapacityUnit::Characters => "characters",
        };
        write!(f, "{} {unit}", self.capacity)
    }
}

/// capacity of `descriptor` for the method selected by `options`
pub fn estimate(descriptor: CarrierDescriptor, options: &CodecOptions) -> Result<CapacityReport> {
    let (capacity, unit) = match (options, &descriptor) {
        (CodecOptions::FrameLsb(opts), CarrierDescriptor::Video(geometry)) => {
            geometry.validate()?;
            (file_in_frames(geometry, opts), CapacityUnit::Bytes)
        }
        (CodecOptions::TextLsb(opts), CarrierDescriptor::Video(geometry)) => {
            geometry.validate()?;
            opts.validate()?;
            (text_in_frames(geometry, opts), CapacityUnit::Characters)
        }
        (CodecOptions::AudioDct(opts), CarrierDescriptor::Audio(geometry)) => {
            opts.validate()?;
            (audio_dct(geometry), CapacityUnit::Bytes)
        }
        (CodecOptions::ContainerAppend, _) => (NOMINAL_CAPACITY, CapacityUnit::Bytes),
        _ => return Err(StegError::UnsupportedCarrier),
    };
    debug!("Capacity of {descriptor:?}: {capacity} {unit:?}");

    Ok(CapacityReport {
        capacity,
        unit,
        descriptor,
    })
}

/// bytes of a file hidden in all channels of all but the reserved frames
pub fn file_in_frames(geometry: &VideoGeometry, options: &FrameLsbOptions) -> u64 {
    let bytes_per_frame = geometry.frame_len() / 8;
    let frames = geometry.frame_count.saturating_sub(options.reserved_frames);
    let overhead = EnvelopeFormat::FileInFrames.framing_len() + METADATA_RESERVE;

    (bytes_per_frame * frames).saturating_sub(overhead) as u64
}

/// frames counted for the text method, at least one
pub fn usable_text_frames(geometry: &VideoGeometry, options: &TextLsbOptions) -> usize {
    let frames = (geometry.frame_count as f64 * options.frame_fraction).floor() as usize;

    frames.clamp(1, geometry.frame_count.max(1))
}

/// characters of a text whose framed token fits into one channel of the usable frames
pub fn text_in_frames(geometry: &VideoGeometry, options: &TextLsbOptions) -> u64 {
    let channels = ChannelSelection::Single(options.channel).channels_used(geometry.channels);
    let bits = geometry.width as usize
        * geometry.height as usize
        * channels
        * usable_text_frames(geometry, options);
    let token_budget = (bits / 8).saturating_sub(EnvelopeFormat::EncryptedText.framing_len());

    max_plaintext_len(token_budget).unwrap_or(0) as u64
}

/// bytes of a text with one bit per audio block
pub fn audio_dct(geometry: &AudioGeometry) -> u64 {
    let bytes = geometry.blocks() / 8;

    bytes.saturating_sub(EnvelopeFormat::TerminatedText.framing_len()) as u64
}

/// fails with [`StegError::CapacityExceeded`] when `needed` is above `available`
pub fn ensure_fits(needed: u64, available: u64) -> Result<()> {
    if needed > available {
        return Err(StegError::CapacityExceeded { needed, available });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use stegavid_cipher::token_len;

    use super::*;
    use crate::media::DctCodecOptions;

    fn video(width: u32, height: u32, frame_count: usize) -> VideoGeometry {
        VideoGeometry {
            frame_count,
            width,
            height,
            channels: 3,
            fps: 30.0,
            has_audio: false,
        }
    }

    #[test]
    fn test_file_capacity_of_small_sequence() {
        let capacity = file_in_frames(&video(64, 64, 30), &FrameLsbOptions::default());

        assert_eq!(capacity, 1536 * 20 - 1060);
        assert_eq!(capacity, 29660);
    }

    #[test]
    fn test_file_capacity_saturates() {
        assert_eq!(file_in_frames(&video(64, 64, 10), &FrameLsbOptions::default()), 0);
        assert_eq!(file_in_frames(&video(8, 8, 12), &FrameLsbOptions::default()), 0);
    }

    #[test]
    fn test_text_capacity_is_the_largest_fitting_text() {
        let options = TextLsbOptions::default();
        for (w, h, frames) in [(64, 64, 30), (32, 24, 3), (16, 16, 1), (100, 7, 9)] {
            let geometry = video(w, h, frames);
            let usable = (w as usize * h as usize * usable_text_frames(&geometry, &options)) / 8;
            let capacity = text_in_frames(&geometry, &options) as usize;
            let framing = EnvelopeFormat::EncryptedText.framing_len();

            if capacity > 0 {
                assert!(framing + token_len(capacity) <= usable);
            }
            assert!(framing + token_len(capacity + 1) > usable);
        }
    }

    #[test]
    fn test_text_uses_at_least_one_frame() {
        let options = TextLsbOptions::default().with_frame_fraction(0.1);
        assert_eq!(usable_text_frames(&video(64, 64, 3), &options), 1);
        assert_eq!(usable_text_frames(&video(64, 64, 30), &TextLsbOptions::default()), 24);
    }

    #[test]
    fn test_audio_capacity() {
        let geometry = AudioGeometry {
            sample_count: 1_000_000,
            channels: 1,
            sample_rate: 44100,
            block_size: 128,
        };

        assert_eq!(geometry.blocks(), 7812);
        assert_eq!(audio_dct(&geometry), 7812 / 8 - 18);
    }

    #[test]
    fn test_container_capacity_is_nominal() {
        let report = estimate(
            CarrierDescriptor::Container { len: 12 },
            &CodecOptions::ContainerAppend,
        )
        .unwrap();

        assert_eq!(report.capacity, u64::from(u32::MAX));
        assert_eq!(report.to_string(), "4294967295 bytes");
    }

    #[test]
    fn test_mismatched_carrier_is_unsupported() {
        let geometry = AudioGeometry {
            sample_count: 1000,
            channels: 1,
            sample_rate: 8000,
            block_size: 128,
        };

        assert!(matches!(
            estimate(CarrierDescriptor::Audio(geometry), &CodecOptions::frame_lsb()),
            Err(StegError::UnsupportedCarrier)
        ));
    }

    #[test]
    fn test_invalid_audio_options_are_rejected() {
        let geometry = AudioGeometry {
            sample_count: 44100,
            channels: 1,
            sample_rate: 44100,
            block_size: 1,
        };
        let options = CodecOptions::AudioDct(DctCodecOptions::default().with_block_size(1));

        assert!(matches!(
            estimate(CarrierDescriptor::Audio(geometry), &options),
            Err(StegError::InvalidCodecOptions(_))
        ));
    }

    #[test]
    fn test_usage_of_a_report() {
        let report = estimate(
            CarrierDescriptor::Video(video(64, 64, 30)),
            &CodecOptions::frame_lsb(),
        )
        .unwrap();

        let usage = report.usage(14830);
        assert_eq!(usage.remaining, 14830);
        assert_eq!(usage.percent_used, 50.0);
        assert!(usage.fits());
        assert_eq!(usage.to_string(), "14830 needed, 50.0% used, 14830 remaining");

        let too_much = report.usage(29661);
        assert_eq!(too_much.remaining, 0);
        assert!(!too_much.fits());
        assert!(report.usage(29660).fits());
    }

    #[test]
    fn test_usage_of_an_empty_capacity() {
        let report = CapacityReport {
            capacity: 0,
            unit: CapacityUnit::Bytes,
            descriptor: CarrierDescriptor::Container { len: 0 },
        };

        assert!(report.usage(0).fits());
        assert!(!report.usage(1).fits());
    }

    #[test]
    fn test_ensure_fits() {
        assert!(ensure_fits(10, 10).is_ok());
        assert!(matches!(
            ensure_fits(11, 10),
            Err(StegError::CapacityExceeded {
                needed: 11,
                available: 10
            })
        ));
    }
}
